// Python bindings, built with `--features python` (maturin).
use std::time::Duration;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyList;
use crate::error::FetchError;
use crate::network::HttpVersion;
use crate::request::{decode, Dispatcher, DispatcherConfig, RequestItem};

#[pyclass(name = "Dispatcher")]
#[derive(Clone)]
pub struct PyDispatcher {
    inner: Dispatcher,
}

#[pymethods]
impl PyDispatcher {
    #[new]
    #[pyo3(signature = (max_concurrent=4, timeout=30.0, max_connections_per_host=4, waits_for_connectivity=true, http_version=None))]
    fn new(
        max_concurrent: usize,
        timeout: f64,
        max_connections_per_host: usize,
        waits_for_connectivity: bool,
        http_version: Option<String>,
    ) -> PyResult<Self> {
        let http_version = match http_version {
            Some(v) => v.parse::<HttpVersion>().map_err(PyValueError::new_err)?,
            None => HttpVersion::Auto,
        };
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(PyValueError::new_err("timeout must be a positive number of seconds"));
        }
        let config = DispatcherConfig::default()
            .with_max_concurrent(max_concurrent)
            .with_request_timeout(Duration::from_secs_f64(timeout))
            .with_max_connections_per_host(max_connections_per_host)
            .with_waits_for_connectivity(waits_for_connectivity)
            .with_http_version(http_version);
        let inner = Dispatcher::new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    #[getter]
    fn completed_count(&self) -> u64 {
        self.inner.completed_count()
    }

    #[getter]
    fn window_size(&self) -> usize {
        self.inner.window_size()
    }

    /// Awaitable; resolves to one dict per url, in completion order.
    #[pyo3(signature = (urls, method=None, tags=None))]
    fn fetch_all<'py>(
        &self,
        py: Python<'py>,
        urls: Vec<String>,
        method: Option<String>,
        tags: Option<Vec<String>>,
    ) -> PyResult<&'py PyAny> {
        let method = method.unwrap_or_else(|| "GET".to_string());
        let tags = tags.unwrap_or_default();
        let requests = urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                let item = RequestItem::from_parts(&method, url)?;
                Ok(match tags.get(i) {
                    Some(tag) => item.with_tag(tag.clone()),
                    None => item,
                })
            })
            .collect::<Result<Vec<_>, FetchError>>()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let dispatcher = self.inner.clone();
        pyo3_asyncio::tokio::future_into_py(py, async move {
            let completions = dispatcher.fetch_all_detailed(requests, decode::raw()).await;

            Python::with_gil(|py| -> PyResult<PyObject> {
                let json = py.import("json")?;
                let py_list = PyList::empty(py);
                for completion in &completions {
                    let row = json.call_method1("loads", (completion.to_json().to_string(),))?;
                    py_list.append(row)?;
                }
                Ok(py_list.into_py(py))
            })
        })
    }

    fn __repr__(&self) -> String {
        format!(
            "Dispatcher(window={}, completed={})",
            self.inner.window_size(),
            self.inner.completed_count()
        )
    }
}

#[pyfunction]
#[pyo3(name = "set_debug", signature = (enabled, target=None))]
fn py_set_debug(enabled: bool, target: Option<String>) {
    crate::debug::set_debug(enabled, target.as_deref());
}

#[pymodule]
fn rusty_batch(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyDispatcher>()?;
    m.add_function(wrap_pyfunction!(py_set_debug, m)?)?;
    Ok(())
}
