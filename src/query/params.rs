//! Control parameters
//!
//! Query parameters prefixed `c:` steer paging, projection, sorting and
//! timing. Everything else is a field filter.

use super::errors::{QueryError, QueryResult};

/// Prefix reserving a query parameter for control use
pub const CONTROL_PREFIX: &str = "c:";

/// Page size when `c:limit` is absent
pub const DEFAULT_LIMIT: u64 = 100;

/// Largest page a single query may return
pub const MAX_LIMIT: u64 = 10_000;

/// Suffix marking a descending sort token
const DESCENDING_SUFFIX: &str = "-1";

/// Direction of one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Store-level direction value
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// One sort key, order-significant within a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses `field` or `field:-1`. Any other suffix sorts ascending.
    pub fn parse(token: &str) -> Self {
        let mut parts = token.split(':');
        let field = parts.next().unwrap_or_default();
        let suffix = parts.next();

        match (suffix, parts.next()) {
            (Some(DESCENDING_SUFFIX), None) => Self::desc(field),
            _ => Self::asc(field),
        }
    }
}

/// Parsed `c:` parameters of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlParams {
    pub start: u64,
    /// Already clamped to [`MAX_LIMIT`]
    pub limit: u64,
    pub show: Vec<String>,
    pub hide: Vec<String>,
    pub sort: Vec<SortKey>,
    pub has: Vec<String>,
    pub timing: bool,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            start: 0,
            limit: DEFAULT_LIMIT,
            show: Vec::new(),
            hide: Vec::new(),
            sort: Vec::new(),
            has: Vec::new(),
            timing: false,
        }
    }
}

impl ControlParams {
    /// Reads control parameters from `(name, value)` pairs.
    ///
    /// Pairs without the control prefix are ignored. List parameters
    /// accumulate across repeats; scalar parameters keep the last value.
    pub fn parse<'a, I>(params: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut control = ControlParams::default();

        for (name, value) in params {
            let Some(param) = name.strip_prefix(CONTROL_PREFIX) else {
                continue;
            };

            match param {
                "start" => {
                    control.start = value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| QueryError::invalid_control(param, value))?;
                }
                "limit" => {
                    let limit = value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| QueryError::invalid_control(param, value))?;
                    if limit == 0 {
                        return Err(QueryError::invalid_control(param, value));
                    }
                    control.limit = limit.min(MAX_LIMIT);
                }
                "show" => control.show.extend(split_list(value)),
                "hide" => control.hide.extend(split_list(value)),
                "has" => control.has.extend(split_list(value)),
                "sort" => control
                    .sort
                    .extend(split_list(value).map(|token| SortKey::parse(&token))),
                "timing" => {
                    control.timing = parse_flag(value)
                        .ok_or_else(|| QueryError::invalid_control(param, value))?;
                }
                other => return Err(QueryError::UnknownControlParam(other.to_string())),
            }
        }

        Ok(control)
    }
}

/// Whether a parameter name is reserved for control use
pub fn is_control_param(name: &str) -> bool {
    name.starts_with(CONTROL_PREFIX)
}

/// Comma-separated list, empty entries dropped
fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "" | "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
