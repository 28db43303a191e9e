//! # 로컬 저장소
//!
//! 편집기 내용, 톤, 약관 동의 여부, 클라이언트 ID를 저장합니다.
//! 읽기/쓰기에 실패해도 저장만 안 될 뿐 편집기는 계속 동작합니다.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::Utc;
use rand_core::{OsRng, RngCore};

pub const EDITOR_KEY: &str = "wordsmith-editor";
pub const TONE_KEY: &str = "wordsmith-tone";
pub const TERMS_KEY: &str = "wordsmith-terms-accepted";
pub const CLIENT_ID_KEY: &str = "wordsmith-client-id";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// 디스크의 JSON 객체. `set`마다 파일 전체를 다시 씁니다.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// `path`가 있으면 읽습니다. 읽을 수 없거나 깨진 파일이면 빈 상태로 시작합니다.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt store");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self { path, values }
    }

    fn flush(&self) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(&self.values)?;
        std::fs::write(&self.path, json)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush() {
            tracing::warn!(path = %self.path.display(), error = %err, "could not persist store");
        }
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// `cw_` + 난수 base36 + 타임스탬프 base36. 비밀값이 아니라 사용량 집계 키입니다.
pub fn generate_client_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    format!("cw_{}{}", base36(OsRng.next_u64()), base36(millis))
}

/// 저장된 클라이언트 ID. 처음 쓸 때 만듭니다.
pub fn client_id(store: &mut dyn KeyValueStore) -> String {
    if let Some(id) = store.get(CLIENT_ID_KEY).filter(|id| !id.is_empty()) {
        return id;
    }
    let id = generate_client_id();
    store.set(CLIENT_ID_KEY, &id);
    id
}
