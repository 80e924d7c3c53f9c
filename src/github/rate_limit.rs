use reqwest::header::HeaderMap;

/// Remaining-request count below which a warning is raised.
pub const LOW_WATER_MARK: u64 = 5;

/// Running view of the API rate budget, fed from response headers.
#[derive(Debug, Default, Clone)]
pub struct RateBudget {
    remaining: Option<u64>,
    limit: Option<u64>,
    reset_at: Option<i64>,
    low_warned: bool,
}

impl RateBudget {
    /// Update counters from `X-RateLimit-*` headers.
    ///
    /// Returns a warning the first time the remaining budget falls below
    /// [`LOW_WATER_MARK`].
    pub fn observe(&mut self, headers: &HeaderMap) -> Option<String> {
        if let Some(remaining) = header_number(headers, "x-ratelimit-remaining") {
            self.remaining = Some(remaining);
        }
        if let Some(limit) = header_number(headers, "x-ratelimit-limit") {
            self.limit = Some(limit);
        }
        if let Some(reset) = header_number::<i64>(headers, "x-ratelimit-reset") {
            self.reset_at = Some(reset);
        }

        match self.remaining {
            Some(remaining) if remaining < LOW_WATER_MARK && !self.low_warned => {
                self.low_warned = true;
                let limit = self
                    .limit
                    .map_or_else(|| "?".to_string(), |l| l.to_string());
                Some(format!(
                    "GitHub API rate limit low: {}/{} remaining",
                    remaining, limit
                ))
            }
            _ => None,
        }
    }

    /// True once the server has reported zero remaining requests.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    #[cfg(test)]
    fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Unix timestamp at which the budget refills, when the server told us.
    pub fn reset_at(&self) -> Option<i64> {
        self.reset_at
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(remaining: &str, limit: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("x-ratelimit-remaining", HeaderValue::from_str(remaining).unwrap());
        h.insert("x-ratelimit-limit", HeaderValue::from_str(limit).unwrap());
        h
    }

    #[test]
    fn test_observe_counters() {
        let mut budget = RateBudget::default();
        assert_eq!(budget.observe(&headers("4999", "5000")), None);
        assert_eq!(budget.remaining(), Some(4999));
        assert_eq!(budget.limit(), Some(5000));
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_low_budget_warns_once() {
        let mut budget = RateBudget::default();
        let warning = budget.observe(&headers("3", "60")).unwrap();
        assert_eq!(warning, "GitHub API rate limit low: 3/60 remaining");
        assert_eq!(budget.observe(&headers("2", "60")), None);
    }

    #[test]
    fn test_exhausted_with_reset() {
        let mut budget = RateBudget::default();
        let mut h = headers("0", "60");
        h.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        budget.observe(&h);
        assert!(budget.is_exhausted());
        assert_eq!(budget.reset_at(), Some(1_700_000_000));
    }

    #[test]
    fn test_missing_headers_keep_previous_values() {
        let mut budget = RateBudget::default();
        budget.observe(&headers("10", "60"));
        budget.observe(&HeaderMap::new());
        assert_eq!(budget.remaining(), Some(10));
    }
}
