//! Nth-prime lookup clients
//!
//! The store never waits on a lookup. A lookup is handed a callback and
//! calls it exactly once, from whatever thread finishes the work; the app
//! turns that callback into an action sent through the mailbox.

use std::time::Duration;

use serde::Deserialize;

/// Receives the lookup result; `None` means the answer is unknown
pub type PrimeCallback = Box<dyn FnOnce(Option<i64>) + Send>;

/// Something that can find the nth prime
pub trait NthPrimeLookup {
    /// Start looking up the `n`th prime; `callback` runs once with the result
    fn nth_prime(&self, n: i64, callback: PrimeCallback);
}

impl<F> NthPrimeLookup for F
where
    F: Fn(i64, PrimeCallback),
{
    fn nth_prime(&self, n: i64, callback: PrimeCallback) {
        self(n, callback)
    }
}

/// Lookup failures; logged and reported to callers as `None`
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no primary result")]
    NoPrimaryResult,

    #[error("primary result {0:?} is not an integer")]
    NotAnInteger(String),

    #[error("no async runtime to run the lookup on")]
    NoRuntime,
}

/// Lookup settings, built from the command line
#[derive(Clone, Debug)]
pub struct LookupConfig {
    /// Query endpoint
    pub api_url: String,
    /// API key; without one the offline sieve is used
    pub app_id: Option<String>,
    /// Force the offline sieve
    pub offline: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

pub const DEFAULT_API_URL: &str = "https://api.wolframalpha.com/v2/query";

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_id: None,
            offline: false,
            timeout: Duration::from_secs(10),
        }
    }
}

impl LookupConfig {
    /// Pick the lookup these settings describe
    pub fn build(&self) -> Result<Box<dyn NthPrimeLookup>, LookupError> {
        match (&self.app_id, self.offline) {
            (Some(app_id), false) => {
                tracing::info!(api_url = %self.api_url, "Using Wolfram|Alpha lookup");
                Ok(Box::new(WolframAlphaClient::new(
                    &self.api_url,
                    app_id,
                    self.timeout,
                )?))
            }
            (None, false) => {
                tracing::info!("No app id configured, using offline sieve");
                Ok(Box::new(SieveLookup))
            }
            (_, true) => {
                tracing::info!("Offline mode, using sieve");
                Ok(Box::new(SieveLookup))
            }
        }
    }
}

// ============================================================================
// Wolfram|Alpha
// ============================================================================

#[derive(Debug, Deserialize)]
struct WolframAlphaResult {
    queryresult: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    primary: Option<bool>,
    #[serde(default)]
    subpods: Vec<SubPod>,
}

#[derive(Debug, Deserialize)]
struct SubPod {
    #[serde(default)]
    plaintext: Option<String>,
}

fn decode_nth_prime(body: &str) -> Result<i64, LookupError> {
    let result: WolframAlphaResult = serde_json::from_str(body)?;
    let text = result
        .queryresult
        .pods
        .into_iter()
        .find(|pod| pod.primary == Some(true))
        .and_then(|pod| pod.subpods.into_iter().next())
        .and_then(|subpod| subpod.plaintext)
        .ok_or(LookupError::NoPrimaryResult)?;

    text.trim()
        .parse::<i64>()
        .map_err(|_| LookupError::NotAnInteger(text))
}

/// Pull the answer out of a Wolfram|Alpha JSON response
///
/// The answer is the plaintext of the first subpod of the first primary pod,
/// read as an integer. Anything else yields `None`.
pub fn parse_nth_prime(body: &str) -> Option<i64> {
    decode_nth_prime(body).ok()
}

/// Looks primes up through the Wolfram|Alpha query API
#[derive(Clone, Debug)]
pub struct WolframAlphaClient {
    http: reqwest::Client,
    api_url: String,
    app_id: String,
}

impl WolframAlphaClient {
    pub fn new(api_url: &str, app_id: &str, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.to_string(),
            app_id: app_id.to_string(),
        })
    }

    /// Run one query and decode the answer
    pub async fn fetch(&self, n: i64) -> Result<i64, LookupError> {
        let input = format!("prime {n}");
        let body = self
            .http
            .get(&self.api_url)
            .query(&[
                ("input", input.as_str()),
                ("format", "plaintext"),
                ("output", "JSON"),
                ("appid", self.app_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        decode_nth_prime(&body)
    }
}

impl NthPrimeLookup for WolframAlphaClient {
    fn nth_prime(&self, n: i64, callback: PrimeCallback) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!(n, error = %LookupError::NoRuntime, "Nth prime lookup failed");
                callback(None);
                return;
            }
        };

        let client = self.clone();
        runtime.spawn(async move {
            let prime = match client.fetch(n).await {
                Ok(prime) => {
                    tracing::debug!(n, prime, "Nth prime lookup finished");
                    Some(prime)
                }
                Err(error) => {
                    tracing::warn!(n, %error, "Nth prime lookup failed");
                    None
                }
            };
            callback(prime);
        });
    }
}

// ============================================================================
// Offline sieve
// ============================================================================

/// Computes the nth prime locally with a sieve of Eratosthenes
#[derive(Clone, Copy, Debug, Default)]
pub struct SieveLookup;

impl SieveLookup {
    /// Largest index the sieve will answer
    pub const MAX_INDEX: i64 = 5_000_000;

    /// The `n`th prime (1-based); `None` for `n < 1` or beyond [`Self::MAX_INDEX`]
    pub fn compute(n: i64) -> Option<i64> {
        if !(1..=Self::MAX_INDEX).contains(&n) {
            return None;
        }
        let n = usize::try_from(n).ok()?;
        let limit = sieve_limit(n);

        let mut composite = vec![false; limit + 1];
        let mut found = 0;
        for candidate in 2..=limit {
            if composite[candidate] {
                continue;
            }
            found += 1;
            if found == n {
                return i64::try_from(candidate).ok();
            }
            let mut multiple = candidate * candidate;
            while multiple <= limit {
                composite[multiple] = true;
                multiple += candidate;
            }
        }
        None
    }
}

/// Upper bound on the nth prime: n(ln n + ln ln n) for n >= 6
fn sieve_limit(n: usize) -> usize {
    if n < 6 {
        return 15;
    }
    let n = n as f64;
    (n * (n.ln() + n.ln().ln())).ceil() as usize
}

impl NthPrimeLookup for SieveLookup {
    /// Sieves on the runtime's blocking pool; inline when there is no runtime
    fn nth_prime(&self, n: i64, callback: PrimeCallback) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || callback(Self::compute(n)));
            }
            Err(_) => callback(Self::compute(n)),
        }
    }
}
