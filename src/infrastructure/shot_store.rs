//! Directory of shot logs served through the history request protocol
//!
//! Every shot lives in `<dir>/<id>.dat`. Ids are zero padded counters, so the
//! newest shot has the highest id; listings are newest first.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::validate;

const EXTENSION: &str = "dat";

/// One stored shot as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredShot {
    pub id: String,
    pub history: String,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotPage {
    pub records: Vec<StoredShot>,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub struct ShotStore {
    dir: PathBuf,
}

impl ShotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(eyre!("invalid id {id:?}"));
        }
        Ok(self.dir.join(format!("{id}.{EXTENSION}")))
    }

    /// All ids, newest first. A missing directory holds no shots.
    pub fn ids(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("reading {}", self.dir.display()))
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        // Unpadded ids still sort numerically when shorter ones come first
        ids.sort_by(|a, b| (b.len(), b).cmp(&(a.len(), a)));
        Ok(ids)
    }

    pub fn list(&self, offset: u64, limit: u64) -> Result<ShotPage> {
        let ids = self.ids()?;
        let total = ids.len() as u64;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(ids.len());
        let end = start
            .saturating_add(usize::try_from(limit).unwrap_or(usize::MAX))
            .min(ids.len());

        let mut records = Vec::with_capacity(end - start);
        for id in &ids[start..end] {
            match self.get(id)? {
                Some(history) => records.push(StoredShot {
                    id: id.clone(),
                    history,
                }),
                // Removed between listing and reading
                None => log::debug!("Shot {id} vanished while listing"),
            }
        }

        Ok(ShotPage {
            records,
            total,
            has_more: (end as u64) < total,
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<String>> {
        let path = self.path(id)?;
        match fs::read_to_string(&path) {
            Ok(history) => Ok(Some(history)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).wrap_err_with(|| format!("reading {}", path.display())),
        }
    }

    /// Remove a shot. Returns `false` if there was nothing to remove.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).wrap_err_with(|| format!("removing {}", path.display())),
        }
    }

    pub fn insert(&self, id: &str, history: &str) -> Result<()> {
        let path = self.path(id)?;
        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("creating {}", self.dir.display()))?;
        fs::write(&path, history).wrap_err_with(|| format!("writing {}", path.display()))
    }

    /// Answer one protocol request. Failures are reported in the `error`
    /// field of the response.
    pub fn handle_request(&self, request: &Value) -> Value {
        let tp = request.get("tp").and_then(Value::as_str).unwrap_or_default();
        let mut response = json!({
            "tp": format!("res:{}", tp.strip_prefix("req:").unwrap_or(tp)),
            "rid": request.get("rid").cloned().unwrap_or(Value::Null),
        });

        if let Err(e) = self.answer(tp, request, &mut response) {
            log::warn!("Request {tp} failed: {e:#}");
            response["error"] = json!(format!("{e:#}"));
        }
        response
    }

    fn answer(&self, tp: &str, request: &Value, response: &mut Value) -> Result<()> {
        let id = || {
            request
                .get("id")
                .and_then(|id| match id {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .ok_or_else(|| eyre!("missing id"))
        };

        match tp {
            "req:history:list" => {
                let offset = validate::ensure_valid_count(request.get("offset").unwrap_or(&Value::Null));
                let limit = validate::ensure_valid_count(request.get("limit").unwrap_or(&Value::Null));
                if limit == 0 {
                    return Err(eyre!("invalid limit"));
                }
                let page = self.list(offset, limit)?;
                response["history"] = serde_json::to_value(&page.records)?;
                response["total"] = json!(page.total);
                response["hasMore"] = json!(page.has_more);
            }
            "req:history:get" => match self.get(&id()?)? {
                Some(history) => response["history"] = json!(history),
                None => return Err(eyre!("not found")),
            },
            "req:history:delete" => {
                if !self.delete(&id()?)? {
                    return Err(eyre!("not found"));
                }
                response["msg"] = json!("Ok");
            }
            other => return Err(eyre!("unknown request type {other:?}")),
        }
        Ok(())
    }
}
