use super::raw::Theme;
use std::collections::BTreeMap;

include!(concat!(env!("OUT_DIR"), "/themes.rs"));

/// The built-in themes plus the ones defined in the design configuration.
#[derive(Clone, Debug, Default)]
pub struct ThemeRegistry {
    custom_themes: BTreeMap<String, Theme>,
}

impl ThemeRegistry {
    /// Build a registry out of the themes in a design configuration.
    ///
    /// Themes can extend built-in themes or other configured themes, in which case they are
    /// merged on top of their base in dependency order.
    pub fn new(themes: &BTreeMap<String, Theme>) -> Result<Self, LoadThemeError> {
        let mut registry = Self::default();
        let mut dependencies = BTreeMap::new();
        for (name, theme) in themes {
            if THEMES.contains_key(name.as_str()) {
                return Err(LoadThemeError::Duplicate(name.clone()));
            }
            registry.custom_themes.insert(name.clone(), theme.clone());
            dependencies.insert(name.clone(), theme.extends.clone());
        }
        let mut graph = ThemeGraph::new(dependencies);
        for theme_name in graph.dependents.keys() {
            let theme_name = theme_name.as_str();
            if !THEMES.contains_key(theme_name) && !registry.custom_themes.contains_key(theme_name) {
                return Err(LoadThemeError::ExtendedThemeNotFound(theme_name.into()));
            }
        }

        while let Some(theme_name) = graph.pop() {
            registry.extend_theme(&theme_name)?;
        }
        if !graph.dependents.is_empty() {
            return Err(LoadThemeError::ExtensionLoop(graph.dependents.into_keys().collect()));
        }
        Ok(registry)
    }

    /// Loads a theme from its name.
    pub fn load_by_name(&self, name: &str) -> Result<Option<Theme>, LoadThemeError> {
        match THEMES.get(name) {
            Some(contents) => Theme::from_slice(name, contents).map(Some),
            None => Ok(self.custom_themes.get(name).cloned()),
        }
    }

    fn extend_theme(&mut self, theme_name: &str) -> Result<(), LoadThemeError> {
        let Some(base_name) = self.custom_themes.get(theme_name).and_then(|theme| theme.extends.clone()) else {
            return Ok(());
        };
        let Some(base_theme) = self.load_by_name(&base_name)? else {
            return Err(LoadThemeError::ExtendedThemeNotFound(base_name));
        };
        let Some(theme) = self.custom_themes.get_mut(theme_name) else {
            return Ok(());
        };
        *theme = merge_struct::merge(&base_theme, &*theme)
            .map_err(|e| LoadThemeError::Corrupted(base_name, e.to_string()))?;
        Ok(())
    }

    /// Get all the registered theme names.
    pub fn theme_names(&self) -> Vec<String> {
        let builtin_themes = THEMES.keys().map(|name| name.to_string());
        self.custom_themes.keys().cloned().chain(builtin_themes).collect()
    }
}

struct ThemeGraph {
    dependents: BTreeMap<String, Vec<String>>,
    ready: Vec<String>,
}

impl ThemeGraph {
    fn new<I>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut dependents: BTreeMap<_, Vec<_>> = BTreeMap::new();
        let mut ready = Vec::new();
        for (name, extends) in dependencies {
            dependents.entry(name.clone()).or_default();
            match extends {
                // Themes extending a configured theme wait for it to be processed.
                Some(base) if !THEMES.contains_key(base.as_str()) => {
                    dependents.entry(base).or_default().push(name);
                }
                _ => ready.push(name),
            }
        }
        Self { dependents, ready }
    }

    fn pop(&mut self) -> Option<String> {
        let theme = self.ready.pop()?;
        if let Some(dependents) = self.dependents.remove(&theme) {
            self.ready.extend(dependents);
        }
        Some(theme)
    }
}

/// An error loading a theme.
#[derive(thiserror::Error, Debug)]
pub enum LoadThemeError {
    #[error("theme '{0}' is corrupted: {1}")]
    Corrupted(String, String),

    #[error("theme '{0}' clashes with a built-in theme")]
    Duplicate(String),

    #[error("extended theme does not exist: {0}")]
    ExtendedThemeNotFound(String),

    #[error("theme has an extension loop involving: {0:?}")]
    ExtensionLoop(Vec<String>),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pptx::Rgb;

    fn extending(base: &str) -> Theme {
        Theme { extends: Some(base.into()), ..Default::default() }
    }

    #[test]
    fn validate_themes() {
        let themes = ThemeRegistry::default();
        for theme_name in THEMES.keys() {
            let Ok(Some(theme)) = themes.load_by_name(theme_name) else {
                panic!("theme '{theme_name}' is corrupted");
            };
            assert!(theme.extends.is_none(), "theme '{theme_name}' uses extends");
            assert!(theme.primary_color.is_some(), "theme '{theme_name}' has no primary color");
        }
    }

    #[test]
    fn load_custom() {
        let themes = BTreeMap::from([("potato".to_string(), extending("dark"))]);
        let registry = ThemeRegistry::new(&themes).expect("loading themes");
        let mut theme = registry.load_by_name("potato").expect("load failed").expect("theme not found");

        // Since we extend the dark theme they must match after we remove the "extends" field.
        let dark = registry.load_by_name("dark").expect("load failed");
        theme.extends.take().expect("no extends");
        assert_eq!(Some(theme), dark);
    }

    #[test]
    fn overrides_win() {
        let mut theme = extending("light");
        theme.accent_color = Some(Rgb::new(1, 2, 3));
        let themes = BTreeMap::from([("mine".to_string(), theme)]);
        let registry = ThemeRegistry::new(&themes).expect("loading themes");
        let theme = registry.load_by_name("mine").expect("load failed").expect("theme not found");
        let light = registry.load_by_name("light").expect("load failed").expect("theme not found");
        assert_eq!(theme.accent_color, Some(Rgb::new(1, 2, 3)));
        assert_eq!(theme.primary_color, light.primary_color);
    }

    #[test]
    fn load_derive_chain() {
        let themes = BTreeMap::from([
            ("A".to_string(), extending("dark")),
            ("B".to_string(), extending("C")),
            ("C".to_string(), extending("A")),
            ("D".to_string(), Theme::default()),
        ]);
        let registry = ThemeRegistry::new(&themes).expect("loading themes");
        let dark = registry.load_by_name("dark").expect("load failed").expect("theme not found");
        for name in ["A", "B", "C"] {
            let theme = registry.load_by_name(name).expect("load failed").expect("theme not found");
            assert_eq!(theme.background_color, dark.background_color, "{name} was not extended");
        }
        registry.load_by_name("D").expect("load failed").expect("D not found");
    }

    #[test]
    fn invalid_derives() {
        let themes = BTreeMap::from([("A".to_string(), extending("non-existent-theme"))]);
        let result = ThemeRegistry::new(&themes);
        assert!(matches!(result, Err(LoadThemeError::ExtendedThemeNotFound(_))));
    }

    #[test]
    fn load_derive_chain_loop() {
        let themes = BTreeMap::from([("A".to_string(), extending("B")), ("B".to_string(), extending("A"))]);
        let err = ThemeRegistry::new(&themes).expect_err("loading themes succeeded");
        let LoadThemeError::ExtensionLoop(names) = err else { panic!("not an extension loop error") };
        assert_eq!(names, &["A", "B"]);
    }

    #[test]
    fn duplicate_builtin() {
        let themes = BTreeMap::from([("dark".to_string(), Theme::default())]);
        let result = ThemeRegistry::new(&themes);
        assert!(matches!(result, Err(LoadThemeError::Duplicate(_))));
    }
}
