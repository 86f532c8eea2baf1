//! File Story Store - 文件系统会话故事存储
//!
//! 每个存储键一个 JSON 文件：`<dir>/<storage_key>.json`，
//! 使 CLI 的多次调用之间可以恢复上一次生成的故事。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::application::ports::{decode_story, encode_story, StoreError, StoryStorePort};
use crate::domain::story::{GeneratedStory, StoryKind};

/// 文件故事存储
pub struct FileStoryStore {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileStoryStore {
    /// 创建存储，目录不存在时自动创建
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, kind: StoryKind) -> PathBuf {
        self.base_dir.join(format!("{}.json", kind.storage_key()))
    }
}

impl StoryStorePort for FileStoryStore {
    fn save(&self, story: &GeneratedStory) -> Result<(), StoreError> {
        let path = self.path_for(story.kind());
        let raw = encode_story(story)?;

        // 先写临时文件再改名，避免中断时留下半个文件
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Io(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Story saved");
        Ok(())
    }

    fn load(&self, kind: StoryKind) -> Result<Option<GeneratedStory>, StoreError> {
        let path = self.path_for(kind);
        match fs::read_to_string(&path) {
            Ok(raw) => decode_story(kind, &raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    fn remove(&self, kind: StoryKind) -> Result<(), StoreError> {
        let path = self.path_for(kind);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Story removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }
}
