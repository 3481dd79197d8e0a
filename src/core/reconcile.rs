use crate::domain::model::{CatalogEntry, RateTable, ReconciledRecord};
use rand::Rng;
use std::sync::Arc;

pub const MULTIPLIER_MIN: f64 = 1000.0;
pub const MULTIPLIER_MAX: f64 = 2000.0;

/// 估算 GDP 用的乘數來源
pub trait MultiplierSource: Send + Sync {
    fn draw(&self) -> f64;
}

/// Uniform draw from `[1000, 2000)` on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformMultiplier;

impl MultiplierSource for UniformMultiplier {
    fn draw(&self) -> f64 {
        rand::rng().random_range(MULTIPLIER_MIN..MULTIPLIER_MAX)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedMultiplier(pub f64);

impl MultiplierSource for FixedMultiplier {
    fn draw(&self) -> f64 {
        self.0
    }
}

impl<F> MultiplierSource for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn draw(&self) -> f64 {
        self()
    }
}

pub fn estimate_indicator(population: u64, rate: f64, multiplier: f64) -> f64 {
    population as f64 * multiplier / rate
}

#[derive(Clone)]
pub struct Reconciler {
    multiplier: Arc<dyn MultiplierSource>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(UniformMultiplier)
    }
}

impl Reconciler {
    pub fn new(multiplier: impl MultiplierSource + 'static) -> Self {
        Self {
            multiplier: Arc::new(multiplier),
        }
    }

    pub fn reconcile(&self, entry: &CatalogEntry, rates: &RateTable) -> ReconciledRecord {
        let mut record = ReconciledRecord {
            name: entry.name.clone(),
            capital: entry.capital.clone(),
            region: entry.region.clone(),
            population: entry.population,
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: None,
            flag_url: entry.flag.clone(),
        };

        match entry.primary_currency_code() {
            Some(code) => {
                record.currency_code = Some(code.to_string());

                if let Some(rate) = rates.get(code).filter(|r| *r > 0.0) {
                    record.exchange_rate = Some(rate);
                    record.estimated_gdp = Some(estimate_indicator(
                        entry.population,
                        rate,
                        self.multiplier.draw(),
                    ));
                } else {
                    tracing::debug!("No usable rate for {} ({})", code, entry.name);
                }
            }
            // 沒有貨幣的國家固定為 0，和「匯率未知」區分
            None => record.estimated_gdp = Some(0.0),
        }

        record
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CurrencyDescriptor;

    fn entry(name: &str, population: u64, codes: &[&str]) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            capital: Some(format!("{} City", name)),
            region: Some("Africa".to_string()),
            population,
            flag: format!("https://flags.example/{}.svg", name.to_lowercase()),
            currencies: codes
                .iter()
                .map(|c| CurrencyDescriptor {
                    code: Some(c.to_string()),
                    name: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_wakanda_scenario() {
        let rates: RateTable = [("WKD", 2.0)].into_iter().collect();
        let record = Reconciler::default().reconcile(&entry("Wakanda", 1_000_000, &["WKD"]), &rates);

        assert_eq!(record.currency_code.as_deref(), Some("WKD"));
        assert_eq!(record.exchange_rate, Some(2.0));
        let gdp = record.estimated_gdp.unwrap();
        assert!((500_000_000.0..1_000_000_000.0).contains(&gdp), "gdp {}", gdp);
    }

    #[test]
    fn test_no_currency_gives_zero_indicator() {
        let rates: RateTable = [("USD", 1.0)].into_iter().collect();
        let record = Reconciler::default().reconcile(&entry("Nowhere", 500, &[]), &rates);

        assert_eq!(record.estimated_gdp, Some(0.0));
        assert!(record.currency_code.is_none());
        assert!(record.exchange_rate.is_none());
    }

    #[test]
    fn test_unknown_currency_keeps_code_only() {
        let rates: RateTable = [("USD", 1.0)].into_iter().collect();
        let record = Reconciler::default().reconcile(&entry("Ruritania", 42, &["RUR"]), &rates);

        assert_eq!(record.currency_code.as_deref(), Some("RUR"));
        assert!(record.exchange_rate.is_none());
        assert!(record.estimated_gdp.is_none());
    }

    #[test]
    fn test_non_positive_rate_is_ignored() {
        let rates: RateTable = [("ZER", 0.0), ("NEG", -3.5)].into_iter().collect();
        let reconciler = Reconciler::default();

        for code in ["ZER", "NEG"] {
            let record = reconciler.reconcile(&entry("Test", 1000, &[code]), &rates);
            assert_eq!(record.currency_code.as_deref(), Some(code));
            assert!(record.exchange_rate.is_none());
            assert!(record.estimated_gdp.is_none());
        }
    }

    #[test]
    fn test_only_first_currency_is_used() {
        let rates: RateTable = [("USD", 1.0)].into_iter().collect();
        let record = Reconciler::new(FixedMultiplier(1500.0))
            .reconcile(&entry("Panama", 100, &["PAB", "USD"]), &rates);

        assert_eq!(record.currency_code.as_deref(), Some("PAB"));
        assert!(record.exchange_rate.is_none());
    }

    #[test]
    fn test_indicator_stays_within_bounds() {
        let rates: RateTable = [("EUR", 0.92)].into_iter().collect();
        let reconciler = Reconciler::default();
        let population = 83_000_000u64;
        let low = population as f64 * MULTIPLIER_MIN / 0.92;
        let high = population as f64 * MULTIPLIER_MAX / 0.92;

        for _ in 0..200 {
            let gdp = reconciler
                .reconcile(&entry("Germany", population, &["EUR"]), &rates)
                .estimated_gdp
                .unwrap();
            assert!(gdp >= low && gdp < high, "gdp {} outside [{}, {})", gdp, low, high);
        }
    }

    #[test]
    fn test_fixed_multiplier_is_reproducible() {
        let rates: RateTable = [("GHS", 12.5)].into_iter().collect();
        let reconciler = Reconciler::new(FixedMultiplier(1250.0));
        let ghana = entry("Ghana", 31_072_940, &["GHS"]);

        let first = reconciler.reconcile(&ghana, &rates);
        let second = reconciler.reconcile(&ghana, &rates);

        assert_eq!(first, second);
        assert_eq!(first.estimated_gdp, Some(31_072_940.0 * 1250.0 / 12.5));
        assert_eq!(first.flag_url, "https://flags.example/ghana.svg");
        assert_eq!(first.capital.as_deref(), Some("Ghana City"));
    }

    #[test]
    fn test_closure_multiplier() {
        let rates: RateTable = [("KES", 100.0)].into_iter().collect();
        let reconciler = Reconciler::new(|| 1000.0);
        let record = reconciler.reconcile(&entry("Kenya", 10, &["KES"]), &rates);
        assert_eq!(record.estimated_gdp, Some(100.0));
    }
}
