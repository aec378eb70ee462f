//! 沙箱文件系统协作者
//!
//! SandboxFs 绑定沙箱根目录，所有相对路径经 resolve 校验不得逃逸（禁止 ../ 与绝对路径）。
//! 目录树按需从磁盘重新枚举，从不跨调用缓存：树必须始终反映地面真值。
//! 读取失败降级为空内容（缺失文件交给评审步骤去发现），写入失败是致命的。

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::core::TurnError;

/// 递归目录树：名字 -> 子树；文件映射到空子树（序列化为 `{}`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SandboxTree(pub BTreeMap<String, SandboxTree>);

impl SandboxTree {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

/// 沙箱文件系统：绑定根目录与忽略列表
#[derive(Debug, Clone)]
pub struct SandboxFs {
    root: PathBuf,
    ignored_dirs: Vec<String>,
}

impl SandboxFs {
    pub fn new(root: impl AsRef<Path>, ignored_dirs: Vec<String>) -> Self {
        let root = root.as_ref().to_path_buf();
        let root = root.canonicalize().unwrap_or(root);
        Self { root, ignored_dirs }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 相对路径解析：拒绝绝对路径与任何 `..` 分量
    fn resolve(&self, path: &str) -> Result<PathBuf, TurnError> {
        let rel = Path::new(path.trim_start_matches("./"));
        let escapes = rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir));
        if escapes {
            return Err(TurnError::PathEscape(path.to_string()));
        }
        Ok(self.root.join(rel))
    }

    /// 枚举沙箱目录树；枚举失败的子目录呈现为空（与地面真值读取一致，不报错）
    pub fn list_tree(&self) -> SandboxTree {
        self.tree_of(&self.root)
    }

    fn tree_of(&self, dir: &Path) -> SandboxTree {
        let mut tree = BTreeMap::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return SandboxTree::default(),
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || self.ignored_dirs.iter().any(|d| d == &name) {
                continue;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                tree.insert(name, self.tree_of(&entry.path()));
            } else {
                tree.insert(name, SandboxTree::default());
            }
        }
        SandboxTree(tree)
    }

    /// 读取文件；任何失败（缺失、逃逸、非 UTF-8）降级为空字符串
    pub fn read_file_or_empty(&self, path: &str) -> String {
        match self.resolve(path) {
            Ok(full) => std::fs::read_to_string(full).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    /// 写回文件内容；自动创建父目录，失败是终止性的
    pub fn write_file(&self, path: &str, content: &str) -> Result<(), TurnError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TurnError::FileWriteFailed(format!("{}: {}", path, e)))?;
        }
        std::fs::write(&full, content)
            .map_err(|e| TurnError::FileWriteFailed(format!("{}: {}", path, e)))
    }
}
