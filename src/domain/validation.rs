//! Analysis response validation.
//!
//! The decoded response body is untrusted. [`validate`] walks the whole
//! structure once, records every failing field by its dotted path, and
//! only builds a [`Metrics`] value when nothing failed.

use serde_json::{Map, Value};

use super::error::{FieldError, PortlensError, Problem};
use super::metrics::{
    DistributionMetrics, Historical, HistoricalRiskMetrics, MarketMetrics, Metrics,
    ReturnsMetrics, RiskMetrics, SpectralMetrics,
};

/// Outcome of validating an analysis response.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(Metrics),
    Invalid(Vec<FieldError>),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn into_result(self) -> Result<Metrics, PortlensError> {
        match self {
            Validation::Valid(metrics) => Ok(metrics),
            Validation::Invalid(reasons) => Err(PortlensError::InvalidResponse { reasons }),
        }
    }
}

/// The five history-based ratios every response must carry.
pub const REQUIRED_RISK_FIELDS: [&str; 5] = [
    "diversificationEffect",
    "treynorRatio",
    "informationRatio",
    "modifiedVaR",
    "omegaRatio",
];

pub fn validate(payload: &Value) -> Validation {
    let mut checker = Checker::default();
    let metrics = checker.metrics(payload);
    match metrics {
        Some(metrics) if checker.errors.is_empty() => Validation::Valid(metrics),
        _ => Validation::Invalid(checker.errors),
    }
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| !v.is_nan()),
        _ => None,
    }
}

impl Checker {
    fn fail(&mut self, path: String, problem: Problem) {
        self.errors.push(FieldError::new(path, problem));
    }

    fn object<'a>(
        &mut self,
        parent: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        let path = join(path, key);
        match parent.get(key) {
            None | Some(Value::Null) => {
                self.fail(path, Problem::Missing);
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.fail(path, Problem::NotObject);
                None
            }
        }
    }

    fn array<'a>(
        &mut self,
        parent: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Vec<Value>> {
        let path = join(path, key);
        match parent.get(key) {
            None | Some(Value::Null) => {
                self.fail(path, Problem::Missing);
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.fail(path, Problem::NotArray);
                None
            }
        }
    }

    fn number(&mut self, parent: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
        let path = join(path, key);
        match parent.get(key) {
            None | Some(Value::Null) => {
                self.fail(path, Problem::Missing);
                None
            }
            Some(value) => {
                let number = as_number(value);
                if number.is_none() {
                    self.fail(path, Problem::NotNumber);
                }
                number
            }
        }
    }

    fn numbers(&mut self, parent: &Map<String, Value>, key: &str, path: &str) -> Option<Vec<f64>> {
        let items = self.array(parent, key, path)?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match as_number(item) {
                Some(v) => out.push(v),
                None => {
                    self.fail(join(path, key), Problem::NotNumberAt { index });
                    return None;
                }
            }
        }
        Some(out)
    }

    fn metrics(&mut self, payload: &Value) -> Option<Metrics> {
        let root = match payload {
            Value::Object(map) => map,
            _ => {
                self.fail("$".to_string(), Problem::NotObject);
                return None;
            }
        };

        let historical = self.historical(root);
        let returns = self.returns(root);
        let risk = self.risk(root);
        let market = self.market(root);
        let distribution = self.distribution(root);
        let spectral = self.spectral(root);

        Some(Metrics {
            returns: returns?,
            risk: risk?,
            market: market?,
            distribution: distribution?,
            spectral: spectral?,
            historical: historical?,
        })
    }

    fn historical(&mut self, root: &Map<String, Value>) -> Option<Historical> {
        let path = "historical";
        let map = self.object(root, path, "")?;

        let candlestick = self.array(map, "candlestick", path).cloned();
        let returns = self.array(map, "returns", path).cloned();
        let risk_metrics = self.historical_risk(map, path);

        Some(Historical {
            candlestick: candlestick?,
            returns: returns?,
            risk_metrics: risk_metrics?,
        })
    }

    fn historical_risk(
        &mut self,
        historical: &Map<String, Value>,
        parent: &str,
    ) -> Option<HistoricalRiskMetrics> {
        let path = join(parent, "riskMetrics");
        let map = self.object(historical, "riskMetrics", parent)?;

        let [diversification, treynor, information, modified_var, omega] =
            REQUIRED_RISK_FIELDS.map(|key| self.number(map, key, &path));

        // Extras are kept only when well-typed.
        let risk_decomposition = map.get("riskDecomposition").and_then(|v| {
            v.as_array()
                .and_then(|items| items.iter().map(as_number).collect::<Option<Vec<_>>>())
        });
        let value_at_risk = map.get("valueatrisk").and_then(as_number);
        let beta = map.get("beta").and_then(as_number);

        Some(HistoricalRiskMetrics {
            diversification_effect: diversification?,
            treynor_ratio: treynor?,
            information_ratio: information?,
            modified_var: modified_var?,
            omega_ratio: omega?,
            risk_decomposition,
            value_at_risk,
            beta,
        })
    }

    fn returns(&mut self, root: &Map<String, Value>) -> Option<ReturnsMetrics> {
        let path = "returns";
        let map = self.object(root, path, "")?;
        let [cagr, annual, best, worst] = ["cagr", "annualReturn", "bestYear", "worstYear"]
            .map(|key| self.number(map, key, path));
        Some(ReturnsMetrics {
            cagr: cagr?,
            annual_return: annual?,
            best_year: best?,
            worst_year: worst?,
        })
    }

    fn risk(&mut self, root: &Map<String, Value>) -> Option<RiskMetrics> {
        let path = "risk";
        let map = self.object(root, path, "")?;
        let [std_dev, drawdown, sharpe, var, cvar] = [
            "standardDev",
            "maxDrawdown",
            "sharpeRatio",
            "varFivePercent",
            "cvarFivePercent",
        ]
        .map(|key| self.number(map, key, path));
        Some(RiskMetrics {
            standard_dev: std_dev?,
            max_drawdown: drawdown?,
            sharpe_ratio: sharpe?,
            var_five_percent: var?,
            cvar_five_percent: cvar?,
        })
    }

    fn market(&mut self, root: &Map<String, Value>) -> Option<MarketMetrics> {
        let path = "market";
        let map = self.object(root, path, "")?;
        let [alpha, beta, correlation, up, down] =
            ["alpha", "beta", "correlation", "upCapture", "downCapture"]
                .map(|key| self.number(map, key, path));
        Some(MarketMetrics {
            alpha: alpha?,
            beta: beta?,
            correlation: correlation?,
            up_capture: up?,
            down_capture: down?,
        })
    }

    fn distribution(&mut self, root: &Map<String, Value>) -> Option<DistributionMetrics> {
        let path = "distribution";
        let map = self.object(root, path, "")?;
        let skewness = self.number(map, "skewness", path);
        let kurtosis = self.number(map, "kurtosis", path);
        Some(DistributionMetrics {
            skewness: skewness?,
            kurtosis: kurtosis?,
        })
    }

    fn spectral(&mut self, root: &Map<String, Value>) -> Option<SpectralMetrics> {
        let path = "spectral";
        let map = self.object(root, path, "")?;
        let periods = self.numbers(map, "significantPeriods", path);
        let powers = self.numbers(map, "powerSpectrum", path);
        let (periods, powers) = (periods?, powers?);

        if periods.len() != powers.len() {
            self.fail(
                path.to_string(),
                Problem::LengthMismatch {
                    left: periods.len(),
                    right: powers.len(),
                },
            );
            return None;
        }

        Some(SpectralMetrics {
            significant_periods: periods,
            power_spectrum: powers,
        })
    }
}
