//! Configuration types for page classification.
//!
//! Two layers exist. [`Thresholds`] is what the caller asks for on every
//! invocation (`min_width` / `min_height`, coerced from loosely typed host
//! parameters). [`ClassifierConfig`] holds the knobs that stay fixed for a
//! tool instance: PDF password, download timeout, progress reporting.

use crate::error::PicSelectError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Default minimum image width in pixels.
pub const DEFAULT_MIN_WIDTH: u32 = 240;

/// Default minimum image height in pixels.
pub const DEFAULT_MIN_HEIGHT: u32 = 70;

/// Minimum pixel dimensions an embedded image must reach to qualify.
///
/// Qualification is area-based: an image qualifies when
/// `width * height >= min_width * min_height`, so a very wide but short
/// image can qualify even though its height is below `min_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
        }
    }
}

impl Thresholds {
    /// Build thresholds from already-typed values, rejecting zeros.
    pub fn new(min_width: u32, min_height: u32) -> Result<Self, PicSelectError> {
        if min_width == 0 {
            return Err(PicSelectError::NonPositiveThreshold {
                name: "min_width",
                value: 0,
            });
        }
        if min_height == 0 {
            return Err(PicSelectError::NonPositiveThreshold {
                name: "min_height",
                value: 0,
            });
        }
        Ok(Self {
            min_width,
            min_height,
        })
    }

    /// Coerce raw host parameter values into thresholds.
    ///
    /// Absent or `null` values fall back to the defaults (240 × 70). Both
    /// values are coerced before either is range-checked, so a non-integer
    /// `min_height` is reported even when `min_width` is also non-positive.
    pub fn from_params(
        min_width: Option<&Value>,
        min_height: Option<&Value>,
    ) -> Result<Self, PicSelectError> {
        let width = coerce_int("min_width", min_width, DEFAULT_MIN_WIDTH)?;
        let height = coerce_int("min_height", min_height, DEFAULT_MIN_HEIGHT)?;

        let width = positive("min_width", width)?;
        let height = positive("min_height", height)?;

        Ok(Self {
            min_width: width,
            min_height: height,
        })
    }

    /// The qualifying area, `min_width * min_height`.
    pub fn min_area(&self) -> u64 {
        u64::from(self.min_width) * u64::from(self.min_height)
    }

    /// Whether an image of `width × height` pixels qualifies.
    pub fn admits(&self, width: u32, height: u32) -> bool {
        u64::from(width) * u64::from(height) >= self.min_area()
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.min_width, self.min_height)
    }
}

/// Integer coercion of a loosely typed parameter value.
fn coerce_int(name: &'static str, raw: Option<&Value>, default: u32) -> Result<i64, PicSelectError> {
    let invalid = |v: &Value| PicSelectError::InvalidThreshold {
        name,
        value: v.to_string(),
    };

    let Some(v) = raw else {
        return Ok(i64::from(default));
    };

    match v {
        Value::Null => Ok(i64::from(default)),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                // Floats truncate toward zero, like an integer cast.
                if f.is_finite() && f.abs() < i64::MAX as f64 {
                    Ok(f.trunc() as i64)
                } else {
                    Err(invalid(v))
                }
            } else {
                Err(invalid(v))
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid(v)),
        _ => Err(invalid(v)),
    }
}

fn positive(name: &'static str, value: i64) -> Result<u32, PicSelectError> {
    if value <= 0 {
        return Err(PicSelectError::NonPositiveThreshold { name, value });
    }
    u32::try_from(value).map_err(|_| PicSelectError::InvalidThreshold {
        name,
        value: value.to_string(),
    })
}

/// Per-tool configuration for classification runs.
///
/// Built via [`ClassifierConfig::builder()`] or using
/// [`ClassifierConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_pic_select::ClassifierConfig;
///
/// let config = ClassifierConfig::builder()
///     .download_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.download_timeout_secs, 30);
/// ```
#[derive(Clone)]
pub struct ClassifierConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for remote inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives per-page scan events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ScanProgressCallback>"),
            )
            .finish()
    }
}

impl ClassifierConfig {
    /// Create a new builder for `ClassifierConfig`.
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClassifierConfig`].
#[derive(Debug)]
pub struct ClassifierConfigBuilder {
    config: ClassifierConfig,
}

impl ClassifierConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClassifierConfig, PicSelectError> {
        if self.config.download_timeout_secs == 0 {
            return Err(PicSelectError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn absent_params_use_defaults() {
        let t = Thresholds::from_params(None, None).unwrap();
        assert_eq!(t, Thresholds::default());
        assert_eq!((t.min_width, t.min_height), (240, 70));
        assert_eq!(t.min_area(), 16_800);
    }

    #[test]
    fn null_params_use_defaults() {
        let t = Thresholds::from_params(Some(&Value::Null), Some(&Value::Null)).unwrap();
        assert_eq!(t, Thresholds::default());
    }

    #[test]
    fn numeric_and_string_forms_coerce() {
        let t = Thresholds::from_params(Some(&json!(300)), Some(&json!(" 80 "))).unwrap();
        assert_eq!((t.min_width, t.min_height), (300, 80));

        let t = Thresholds::from_params(Some(&json!(120.9)), Some(&json!("+5"))).unwrap();
        assert_eq!((t.min_width, t.min_height), (120, 5));
    }

    #[test]
    fn non_integer_is_validation_error() {
        for bad in [json!("abc"), json!("2.5"), json!([1]), json!({})] {
            let err = Thresholds::from_params(Some(&bad), None).unwrap_err();
            assert!(
                matches!(err, PicSelectError::InvalidThreshold { name: "min_width", .. }),
                "{bad} → {err:?}"
            );
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn non_positive_is_validation_error() {
        let err = Thresholds::from_params(Some(&json!(0)), None).unwrap_err();
        assert!(matches!(
            err,
            PicSelectError::NonPositiveThreshold {
                name: "min_width",
                value: 0
            }
        ));

        let err = Thresholds::from_params(None, Some(&json!("-3"))).unwrap_err();
        assert!(matches!(
            err,
            PicSelectError::NonPositiveThreshold {
                name: "min_height",
                value: -3
            }
        ));

        // 0.5 truncates to 0.
        assert!(Thresholds::from_params(Some(&json!(0.5)), None).is_err());
    }

    #[test]
    fn booleans_coerce_like_integers() {
        let t = Thresholds::from_params(Some(&json!(true)), Some(&json!(true))).unwrap();
        assert_eq!((t.min_width, t.min_height), (1, 1));

        let err = Thresholds::from_params(None, Some(&json!(false))).unwrap_err();
        assert!(matches!(
            err,
            PicSelectError::NonPositiveThreshold {
                name: "min_height",
                value: 0
            }
        ));
    }

    #[test]
    fn coercion_error_wins_over_range_error() {
        let err = Thresholds::from_params(Some(&json!(-1)), Some(&json!("x"))).unwrap_err();
        assert!(matches!(err, PicSelectError::InvalidThreshold { name: "min_height", .. }));
    }

    #[test]
    fn values_beyond_u32_are_rejected() {
        let err = Thresholds::from_params(Some(&json!(5_000_000_000_i64)), None).unwrap_err();
        assert!(matches!(err, PicSelectError::InvalidThreshold { .. }));
    }

    #[test]
    fn admits_is_area_based() {
        let t = Thresholds::default();
        assert!(t.admits(300, 100));
        assert!(t.admits(240, 70));
        assert!(!t.admits(100, 50));
        // Wide and short: height 20 < 70, but 1000 * 20 >= 16800.
        assert!(t.admits(1000, 20));
        assert!(!t.admits(0, 1_000_000));
    }

    #[test]
    fn admits_does_not_overflow() {
        let t = Thresholds::new(u32::MAX, u32::MAX).unwrap();
        assert!(t.admits(u32::MAX, u32::MAX));
        assert!(!t.admits(u32::MAX, u32::MAX - 1));
    }

    #[test]
    fn new_rejects_zero() {
        assert!(Thresholds::new(0, 10).is_err());
        assert!(Thresholds::new(10, 0).is_err());
        assert_eq!(Thresholds::new(10, 20).unwrap().to_string(), "10x20");
    }

    #[test]
    fn builder_validates_timeout() {
        let err = ClassifierConfig::builder()
            .download_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PicSelectError::InvalidConfig(_)));

        let cfg = ClassifierConfig::builder().password("secret").build().unwrap();
        assert_eq!(cfg.password.as_deref(), Some("secret"));
        assert!(!format!("{cfg:?}").contains("secret"));
    }
}
