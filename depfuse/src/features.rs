use std::fmt;
use std::mem;

use itertools::Itertools;

/// Features.
///
/// Ordered morphological features of a `Token`. Each feature is a `name=value` pair, legacy
/// treebanks also use bare names without a value.
#[derive(Clone, Default, Debug, Eq, PartialEq)]
pub struct Features {
    vec: Vec<(String, Option<String>)>,
}

impl<S> From<S> for Features
where
    S: AsRef<str>,
{
    fn from(s: S) -> Self {
        let vec = s
            .as_ref()
            .split('|')
            .map(|f| {
                if let Some(idx) = f.find('=') {
                    let (k, v) = f.split_at(idx);
                    (k.into(), Some(v[1..].into()))
                } else {
                    (f.into(), None)
                }
            })
            .collect();
        Features { vec }
    }
}

impl Features {
    /// Construct empty `Features`.
    pub fn new() -> Self {
        Features::default()
    }

    /// Construct `Features` from `vec`.
    pub fn from_vec(vec: Vec<(String, Option<String>)>) -> Self {
        Features { vec }
    }

    /// Get a slice of the backing `Vec`.
    pub fn inner(&self) -> &[(String, Option<String>)] {
        &self.vec
    }

    /// Returns whether there are no features.
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Returns whether every feature carries a value.
    pub fn is_attribute_value(&self) -> bool {
        self.vec.iter().all(|(_, v)| v.is_some())
    }

    /// Insert `key` with `val`.
    ///
    /// If `key` was present, the replaced value is returned, otherwise `None`.
    pub fn insert<K, V>(&mut self, key: K, val: Option<V>) -> Option<String>
    where
        V: Into<String>,
        K: AsRef<str>,
    {
        let key = key.as_ref();
        let val = val.map(Into::into);
        for i in 0..self.vec.len() {
            if self.vec[i].0 == key {
                return mem::replace(&mut self.vec[i].1, val);
            }
        }
        self.vec.push((key.into(), val));
        None
    }

    /// Get the value associated with `key`.
    pub fn get_val(&self, key: &str) -> Option<&str> {
        self.vec.iter().find_map(|(k, v)| {
            if key == k.as_str() {
                v.as_ref().map(String::as_str)
            } else {
                None
            }
        })
    }

    /// Remove the tuple associated with `key`.
    ///
    /// Returns `None` if `key` was not found.
    pub fn remove(&mut self, key: &str) -> Option<(String, Option<String>)> {
        for i in 0..self.vec.len() {
            if self.vec[i].0 == key {
                return Some(self.vec.remove(i));
            }
        }
        None
    }

    /// Keep only the features for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.vec.retain(|(k, _)| keep(k));
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let joined = self
            .vec
            .iter()
            .map(|(k, v)| {
                if let Some(v) = v {
                    format!("{}={}", k, v)
                } else {
                    k.to_owned()
                }
            })
            .join("|");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod test {
    use super::Features;

    #[test]
    fn features_test() {
        let mut features = Features::from("Case=Nom|Foreign|Number=Sing");
        assert_eq!(
            features,
            Features::from_vec(vec![
                ("Case".into(), Some("Nom".into())),
                ("Foreign".into(), None),
                ("Number".into(), Some("Sing".into()))
            ])
        );
        assert!(!features.is_attribute_value());
        assert_eq!(features.to_string(), "Case=Nom|Foreign|Number=Sing");
        assert_eq!(features.get_val("Foreign"), None);
        assert_eq!(features.get_val("Case"), Some("Nom"));
        assert_eq!(features.remove("Foreign"), Some(("Foreign".into(), None)));
        assert_eq!(features.remove("nonsense"), None);
        assert_eq!(features.get_val("nonsense"), None);
        assert!(features.is_attribute_value());
        let replace: Option<String> = None;
        assert_eq!(features.insert("Case", replace), Some("Nom".into()));
        assert_eq!(features.to_string(), "Case|Number=Sing");
    }

    #[test]
    fn value_keeps_later_separators() {
        let features = Features::from("Gloss=a=b");
        assert_eq!(features.get_val("Gloss"), Some("a=b"));
        assert_eq!(features.to_string(), "Gloss=a=b");
    }

    #[test]
    fn retain_features() {
        let mut features = Features::from("Case=Nom|Gender=Fem|Number=Sing");
        features.retain(|k| k != "Gender");
        assert_eq!(features.to_string(), "Case=Nom|Number=Sing");
        features.retain(|_| false);
        assert!(features.is_empty());
    }
}
