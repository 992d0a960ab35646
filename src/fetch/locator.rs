// src/fetch/locator.rs

use url::Url;

use crate::plan::FetchUnit;

/// Public TLC trip-data bucket.
pub const DEFAULT_BASE_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data";
pub const DEFAULT_EXTENSION: &str = ".parquet";

/// Maps a fetch unit to `<base>/<category>_tripdata_<YYYY>-<MM><ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator {
    base: String,
    extension: String,
}

impl Default for SourceLocator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SourceLocator {
    /// `base` is a URL or a directory; a trailing `/` is ignored.
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_extension(base, DEFAULT_EXTENSION)
    }

    pub fn with_extension(base: impl Into<String>, extension: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            base,
            extension: extension.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// True when the base is an http(s) URL rather than a filesystem location.
    pub fn is_remote(&self) -> bool {
        Url::parse(&self.base)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    pub fn file_name(&self, unit: &FetchUnit) -> String {
        format!(
            "{}_tripdata_{}-{:02}{}",
            unit.category, unit.period.year, unit.period.month, self.extension
        )
    }

    pub fn locate(&self, unit: &FetchUnit) -> String {
        format!("{}/{}", self.base, self.file_name(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::YearMonth;

    fn unit(category: &str, year: i32, month: u32) -> FetchUnit {
        FetchUnit {
            category: category.to_string(),
            period: YearMonth { year, month },
        }
    }

    #[test]
    fn default_template() {
        let loc = SourceLocator::default();
        assert_eq!(
            loc.locate(&unit("yellow", 2023, 1)),
            "https://d37ci6vzurychx.cloudfront.net/trip-data/yellow_tripdata_2023-01.parquet"
        );
        assert_eq!(
            loc.locate(&unit("fhvhv", 2019, 12)),
            "https://d37ci6vzurychx.cloudfront.net/trip-data/fhvhv_tripdata_2019-12.parquet"
        );
        assert!(loc.is_remote());
    }

    #[test]
    fn same_unit_same_identifier() {
        let loc = SourceLocator::default();
        let u = unit("green", 2021, 7);
        assert_eq!(loc.locate(&u), loc.locate(&u.clone()));
    }

    #[test]
    fn trailing_slash_and_local_base() {
        let loc = SourceLocator::with_extension("/data/mirror/", ".csv");
        assert_eq!(
            loc.locate(&unit("fhv", 2020, 3)),
            "/data/mirror/fhv_tripdata_2020-03.csv"
        );
        assert!(!loc.is_remote());
    }
}
