//! # Blob Filter Service
//!
//! 除外パターンに一致しない最初のオブジェクトを選ぶ

use regex::Regex;

use crate::domain::error::GcpError;

/// オブジェクト名の除外フィルタ
#[derive(Debug, Clone, Default)]
pub struct BlobFilter {
    patterns: Vec<Regex>,
}

impl BlobFilter {
    /// パターン文字列から作成
    ///
    /// 空行は無視する（空パターンは全ての名前に一致してしまうため）
    ///
    /// # Errors
    ///
    /// 正規表現として不正なパターンがあれば `InvalidInput`
    pub fn new<I, S>(patterns: I) -> Result<Self, GcpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .map(|p| {
                Regex::new(&p).map_err(|e| {
                    GcpError::InvalidInput(format!("invalid exclusion pattern {:?}: {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// 1行1パターンのテキストから作成
    pub fn from_lines(content: &str) -> Result<Self, GcpError> {
        Self::new(content.lines())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 名前がいずれかのパターンに一致するか
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }

    /// 除外されない最初の要素
    pub fn first_allowed<'a, T, F>(&self, items: &'a [T], name_of: F) -> Option<&'a T>
    where
        F: Fn(&T) -> &str,
    {
        items.iter().find(|item| !self.is_excluded(name_of(item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = BlobFilter::default();
        assert!(!filter.is_excluded("anything.json"));
    }

    #[test]
    fn test_search_semantics_not_full_match() {
        let filter = BlobFilter::new(["processed"]).unwrap();
        assert!(filter.is_excluded("data/processed/file.json"));
        assert!(!filter.is_excluded("data/raw/file.json"));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let filter = BlobFilter::from_lines("^tmp/\n\n   \n\\.bak$\n").unwrap();
        assert_eq!(filter.len(), 2);
        assert!(!filter.is_excluded("data/file.json"));
        assert!(filter.is_excluded("tmp/file.json"));
        assert!(filter.is_excluded("data/file.bak"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = BlobFilter::new(["(unclosed"]);
        assert!(matches!(result, Err(GcpError::InvalidInput(_))));
    }

    #[test]
    fn test_first_allowed() {
        let names = vec![
            "tmp/a.json".to_string(),
            "b.bak".to_string(),
            "c.json".to_string(),
            "d.json".to_string(),
        ];
        let filter = BlobFilter::new(["^tmp/", "\\.bak$"]).unwrap();

        let first = filter.first_allowed(&names, |n| n.as_str());
        assert_eq!(first.map(String::as_str), Some("c.json"));
    }

    #[test]
    fn test_first_allowed_none() {
        let names = vec!["tmp/a.json".to_string()];
        let filter = BlobFilter::new(["^tmp/"]).unwrap();
        assert!(filter.first_allowed(&names, |n| n.as_str()).is_none());
    }
}
