use crate::domain::model::PersistedRow;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    GdpDesc,
    GdpAsc,
}

impl SortOrder {
    /// 未知的排序值直接忽略
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "gdp_desc" => Some(SortOrder::GdpDesc),
            "gdp_asc" => Some(SortOrder::GdpAsc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

fn matches(field: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted.filter(|w| !w.is_empty()) {
        Some(wanted) => field.is_some_and(|f| f.eq_ignore_ascii_case(wanted)),
        None => true,
    }
}

impl CountryQuery {
    pub fn apply(&self, rows: Vec<PersistedRow>) -> Vec<PersistedRow> {
        let mut rows: Vec<PersistedRow> = rows
            .into_iter()
            .filter(|r| matches(r.region.as_deref(), self.region.as_deref()))
            .filter(|r| matches(r.currency_code.as_deref(), self.currency.as_deref()))
            .collect();

        // 沒有估算值的國家當作 0 排序
        let gdp = |r: &PersistedRow| r.estimated_gdp.unwrap_or(0.0);
        match self.sort.as_deref().and_then(SortOrder::parse) {
            Some(SortOrder::GdpDesc) => rows.sort_by(|a, b| gdp(b).total_cmp(&gdp(a))),
            Some(SortOrder::GdpAsc) => rows.sort_by(|a, b| gdp(a).total_cmp(&gdp(b))),
            None => {}
        }
        rows
    }
}
