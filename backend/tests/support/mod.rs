#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crop_coverage::earthengine::{
    EarthEngine, EngineError, EngineResult, Expression, ThumbnailFormat,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const FAKE_THUMBNAIL_URL: &str = "https://fake.test/v1/projects/p/thumbnails/abc:getPixels";
pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// In-memory [`EarthEngine`] answering mean-EVI and area queries with canned
/// values and recording every expression it receives.
pub struct FakeEngine {
    mean_evi: Option<f64>,
    area: Option<f64>,
    area_by_month: HashMap<String, f64>,
    compute_error: Option<String>,
    thumbnail_error: Option<String>,
    download_error: Option<String>,
    image: Vec<u8>,
    computed: Mutex<Vec<Expression>>,
    downloads: Mutex<Vec<String>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            mean_evi: Some(0.3),
            area: Some(4.2),
            area_by_month: HashMap::new(),
            compute_error: None,
            thumbnail_error: None,
            download_error: None,
            image: PNG_MAGIC.to_vec(),
            computed: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mean_evi(mut self, evi: Option<f64>) -> Self {
        self.mean_evi = evi;
        self
    }

    pub fn with_area(mut self, area: Option<f64>) -> Self {
        self.area = area;
        self
    }

    pub fn with_month_area(mut self, month: &str, area: f64) -> Self {
        self.area_by_month.insert(month.to_string(), area);
        self
    }

    pub fn failing_compute(mut self, message: &str) -> Self {
        self.compute_error = Some(message.to_string());
        self
    }

    pub fn failing_thumbnail(mut self, message: &str) -> Self {
        self.thumbnail_error = Some(message.to_string());
        self
    }

    pub fn failing_download(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn computed(&self) -> Vec<Expression> {
        self.computed.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    fn month_of(expression: &Expression) -> Option<String> {
        expression
            .constant_arguments("Date")
            .first()
            .and_then(|args| args.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
impl EarthEngine for FakeEngine {
    async fn compute_value(&self, expression: &Expression) -> EngineResult<Value> {
        self.computed.lock().unwrap().push(expression.clone());

        if let Some(message) = &self.compute_error {
            return Err(EngineError::Api {
                status: 400,
                message: message.clone(),
            });
        }

        if expression.invokes("Reducer.mean") {
            return Ok(match self.mean_evi {
                Some(evi) => json!({ "evi": evi }),
                None => json!({}),
            });
        }

        let month_area = Self::month_of(expression).and_then(|m| self.area_by_month.get(&m).copied());
        Ok(match month_area.or(self.area) {
            Some(area) => json!({ "area": area }),
            None => json!({}),
        })
    }

    async fn create_thumbnail(
        &self,
        expression: &Expression,
        format: ThumbnailFormat,
    ) -> EngineResult<String> {
        assert_eq!(format, ThumbnailFormat::Png);
        assert!(expression.invokes("Image.visualize"));

        match &self.thumbnail_error {
            Some(message) => Err(EngineError::Api {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(FAKE_THUMBNAIL_URL.to_string()),
        }
    }

    async fn download(&self, url: &str) -> EngineResult<Vec<u8>> {
        self.downloads.lock().unwrap().push(url.to_string());
        match &self.download_error {
            Some(message) => Err(EngineError::Transport(message.clone())),
            None => Ok(self.image.clone()),
        }
    }
}
