// martgate-core/src/domain/columns.rs

use std::collections::BTreeMap;

/// Case-normalizing view over a result header.
///
/// Built once per check; every lookup goes through the UPPERCASE key so a
/// renamed or re-cased column surfaces as "missing" instead of a query error.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    by_upper: BTreeMap<String, String>,
    found: Vec<String>,
}

impl ColumnIndex {
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for column in columns {
            let original = column.as_ref().to_string();
            index
                .by_upper
                .entry(original.to_uppercase())
                .or_insert_with(|| original.clone());
            index.found.push(original);
        }
        index
    }

    /// Original spelling of `name`, matched case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_upper.get(&name.to_uppercase()).map(String::as_str)
    }

    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.resolve(name).is_none())
            .collect()
    }

    /// Resolves every required column, or returns the ones that are absent.
    pub fn require<'a, const N: usize>(
        &self,
        required: [&'a str; N],
    ) -> Result<[String; N], Vec<&'a str>> {
        let missing = self.missing(&required);
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(required.map(|name| self.resolve(name).unwrap_or(name).to_string()))
    }

    /// Columns whose uppercase name contains any of `markers`, in
    /// lexicographic order of the uppercase name.
    pub fn matching<S: AsRef<str>>(&self, markers: &[S]) -> Vec<&str> {
        self.by_upper
            .iter()
            .filter(|(upper, _)| {
                markers
                    .iter()
                    .any(|m| upper.contains(&m.as_ref().to_uppercase()))
            })
            .map(|(_, original)| original.as_str())
            .collect()
    }

    /// Header in warehouse order, as found.
    pub fn found(&self) -> &[String] {
        &self.found
    }

    pub fn describe(&self) -> String {
        format!("[{}]", self.found.join(", "))
    }
}
