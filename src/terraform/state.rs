use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One line of `terraform state list`, split into its parts.
///
/// `module.net.module.subnets.aws_subnet.private["a.b"]` becomes
/// module path `["net", "subnets"]`, type `aws_subnet`, name `private["a.b"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateAddress {
    pub module_path: Vec<String>,
    pub data: bool,
    pub resource_type: String,
    pub name: String,
}

impl StateAddress {
    pub fn parse(address: &str) -> Option<StateAddress> {
        let parts = split_address(address.trim());
        let mut iter = parts.into_iter().peekable();
        let mut module_path = Vec::new();

        while iter.peek().map(String::as_str) == Some("module") {
            iter.next();
            module_path.push(iter.next()?);
        }

        let data = iter.peek().map(String::as_str) == Some("data");
        if data {
            iter.next();
        }

        let resource_type = iter.next()?;
        let name = iter.collect::<Vec<_>>().join(".");
        if name.is_empty() {
            return None;
        }

        Some(StateAddress {
            module_path,
            data,
            resource_type,
            name,
        })
    }

    /// Top-level module, if the resource lives in one.
    pub fn root_module(&self) -> Option<&str> {
        self.module_path.first().map(String::as_str)
    }

    /// Address relative to the innermost module.
    pub fn local_address(&self) -> String {
        if self.data {
            format!("data.{}.{}", self.resource_type, self.name)
        } else {
            format!("{}.{}", self.resource_type, self.name)
        }
    }
}

impl fmt::Display for StateAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for module in &self.module_path {
            write!(f, "module.{}.", module)?;
        }
        write!(f, "{}", self.local_address())
    }
}

// Splits on '.', except inside `[...]` index expressions.
fn split_address(address: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;

    for c in address.chars() {
        match c {
            '"' if depth > 0 => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '.' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Distinct top-level module names in a state listing, sorted.
pub fn modules_from_state<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| StateAddress::parse(line.as_ref()))
        .filter_map(|addr| addr.root_module().map(|m| strip_index(m).to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Resources grouped by top-level module; root resources use the key `""`.
pub fn group_by_module<S: AsRef<str>>(lines: &[S]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let key = StateAddress::parse(line)
            .and_then(|addr| addr.root_module().map(|m| strip_index(m).to_string()))
            .unwrap_or_default();
        groups.entry(key).or_default().push(line.to_string());
    }
    groups
}

// `module.app[0]` and `module.app["blue"]` both belong to module `app`.
fn strip_index(module: &str) -> &str {
    module.split('[').next().unwrap_or(module)
}
