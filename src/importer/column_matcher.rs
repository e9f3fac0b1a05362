// ==========================================
// S&OP 控制塔 - 列名匹配器
// ==========================================
// 职责: "找到列名包含 X 的列" 的统一实现
// 规则: 备选模式按优先级依次尝试；同一模式内所有片段须同时出现
//       （不区分大小写）；同一模式按列顺序取第一个命中
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatcher {
    patterns: Vec<Vec<String>>,
}

impl ColumnMatcher {
    /// 单一模式：列名须包含全部片段
    pub fn all_of(fragments: &[&str]) -> Self {
        Self {
            patterns: vec![fragments.iter().map(|f| f.to_lowercase()).collect()],
        }
    }

    /// 从配置模式构建
    pub fn from_patterns(patterns: &[Vec<String>]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| p.iter().map(|f| f.to_lowercase()).collect())
                .collect(),
        }
    }

    /// 返回第一个命中列的下标
    pub fn find<S: AsRef<str>>(&self, labels: &[S]) -> Option<usize> {
        let lowered: Vec<String> = labels.iter().map(|l| l.as_ref().to_lowercase()).collect();

        self.patterns
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .find_map(|pattern| {
                lowered
                    .iter()
                    .position(|label| pattern.iter().all(|fragment| label.contains(fragment.as_str())))
            })
    }

    /// 返回第一个命中列的列名
    pub fn find_label<'a, S: AsRef<str>>(&self, labels: &'a [S]) -> Option<&'a str> {
        self.find(labels).map(|idx| labels[idx].as_ref())
    }

    /// 单列名是否命中任一模式
    pub fn matches(&self, label: &str) -> bool {
        self.find(&[label]).is_some()
    }
}
