// lensflow-desk/src/services/session_store.rs

//! Resume store for the desk. One desk invocation is one "page load", so the
//! token has to outlive the process that redirected to the gateway: it is kept
//! as a single JSON file in the session directory and deleted when read.

use lensflow::{ResumeStore, ResumeToken, ServiceError, ServiceResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TOKEN_FILE: &str = "payment-resume.json";

#[derive(Debug, Clone)]
pub struct FileResumeStore {
  path: PathBuf,
}

impl FileResumeStore {
  pub fn new(session_dir: impl AsRef<Path>) -> Self {
    Self {
      path: session_dir.as_ref().join(TOKEN_FILE),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

fn storage_error(action: &str, path: &Path, e: impl std::fmt::Display) -> ServiceError {
  ServiceError::Storage(format!("{} {}: {}", action, path.display(), e))
}

impl ResumeStore for FileResumeStore {
  fn save(&self, token: ResumeToken) -> ServiceResult<()> {
    if let Some(dir) = self.path.parent() {
      fs::create_dir_all(dir).map_err(|e| storage_error("creating", dir, e))?;
    }
    let json = serde_json::to_vec_pretty(&token).map_err(|e| ServiceError::Decode(e.to_string()))?;
    // Write then rename, so a reader never sees half a token.
    let staging = self.path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|e| storage_error("writing", &staging, e))?;
    fs::rename(&staging, &self.path).map_err(|e| storage_error("replacing", &self.path, e))?;
    debug!(path = %self.path.display(), order_id = token.order_id, "Resume token written.");
    Ok(())
  }

  fn load_once(&self) -> ServiceResult<Option<ResumeToken>> {
    let bytes = match fs::read(&self.path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(storage_error("reading", &self.path, e)),
    };
    if let Err(e) = fs::remove_file(&self.path) {
      warn!(path = %self.path.display(), error = %e, "Resume token could not be removed after reading.");
    }
    serde_json::from_slice(&bytes)
      .map(Some)
      .map_err(|e| ServiceError::Decode(format!("resume token: {}", e)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lensflow::{Money, OrderStatus};

  #[test]
  fn token_survives_a_new_store_instance_and_is_read_once() {
    let dir = tempfile::tempdir().unwrap();
    FileResumeStore::new(dir.path())
      .save(ResumeToken::issue(482, OrderStatus::Shipping, Money(200_000)))
      .unwrap();

    let store = FileResumeStore::new(dir.path());
    let token = store.load_once().unwrap().expect("token on disk");
    assert_eq!((token.order_id, token.amount), (482, Money(200_000)));
    assert!(!store.path().exists());
    assert_eq!(store.load_once().unwrap(), None);
  }

  #[test]
  fn missing_session_dir_is_created_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("desk").join("session");
    let store = FileResumeStore::new(&nested);
    assert_eq!(store.load_once().unwrap(), None);
    store.save(ResumeToken::issue(1, OrderStatus::Pending, Money(10))).unwrap();
    assert!(nested.join(TOKEN_FILE).exists());
  }

  #[test]
  fn corrupt_token_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileResumeStore::new(dir.path());
    fs::write(store.path(), b"{not json").unwrap();
    assert!(matches!(store.load_once(), Err(ServiceError::Decode(_))));
    assert_eq!(store.load_once().unwrap(), None);
  }
}
