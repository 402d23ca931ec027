use std::path::{Path, PathBuf};

/// 待壓縮檔案佇列
///
/// 保持加入順序，並以路徑去重。壓縮完成後檔案仍留在佇列中。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQueue {
    files: Vec<PathBuf>,
}

impl FileQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// 加入單一路徑，已存在時不做任何事並回傳 `false`
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.files.push(path);
        true
    }

    /// 加入多個路徑，回傳實際新增的數量
    pub fn add_many<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|p| self.add(p))
            .filter(|added| *added)
            .count()
    }

    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.files.get(index).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// 取得目前佇列的快照，交給背景工作執行緒使用
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.clone()
    }
}
