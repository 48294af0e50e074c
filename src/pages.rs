//! Page definitions and the per-display page registry.
//!
//! A display owns an ordered list of pages, exactly one of which is active.
//! Pages come from `[[page]]` tables in the display config:
//!
//! ```toml
//! [[page]]
//! name = "orbit"
//! text_file = "pages/orbit.txt"
//! button = "B1"
//! default = true
//!
//! [[page]]
//! name = "log"
//! text_handler = "log_viewer"
//! button = "B1"
//! ```
//!
//! # Loading
//!
//! Each definition is validated on its own. A rejected definition is logged
//! and reported, and the remaining pages still load. Surviving pages are
//! numbered `0..n` in config order; that number is what gets persisted.
//!
//! # Initial page
//!
//! 1. The index persisted under the display id, if it is in range
//! 2. The first page marked `default = true`
//! 3. Page 0
//!
//! # Buttons
//!
//! Several pages may share a button. Pressing it selects the first of them,
//! or the next one after the active page when the active page is bound to
//! that button.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::PageError;
use crate::persistence::PersistentStore;
use crate::providers::ContentProviders;
use crate::template::Template;
use crate::{log_error, log_info, log_warn};

// =============================================================================
// Definitions
// =============================================================================

/// One `[[page]]` table as written in the config.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageDefinition {
    pub name: Option<String>,
    /// Literal template text.
    pub text: Option<String>,
    /// Template file, relative to the config directory.
    pub text_file: Option<String>,
    /// Name of a registered text provider.
    pub text_handler: Option<String>,
    pub default: bool,
    /// Trigger binding that selects this page.
    pub button: Option<String>,
    /// `"camera"`, `"texture"` or `"handler"`.
    pub background: Option<String>,
    pub camera_transform: Option<String>,
    pub fov: Option<f32>,
    pub texture: Option<String>,
    pub background_handler: Option<String>,
}

/// What the registry can resolve definitions against.
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    /// Base for relative `text_file` paths.
    pub base_dir: Option<&'a Path>,
    pub providers: &'a ContentProviders,
}

// =============================================================================
// Pages
// =============================================================================

/// Where a page's text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageText {
    Template(Template),
    Provider(String),
}

/// Camera feed parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSpec {
    pub transform: String,
    pub fov: Option<f32>,
}

/// What is drawn under the text.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Background {
    #[default]
    None,
    Camera(CameraSpec),
    Texture(String),
    Handler(String),
}

/// A validated page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub index: usize,
    pub name: String,
    pub text: PageText,
    pub background: Background,
    pub button: Option<String>,
    pub is_default: bool,
}

impl Page {
    /// Validate definition number `definition` and build page `index`.
    pub fn from_definition(
        index: usize,
        definition: usize,
        def: &PageDefinition,
        ctx: &LoadContext<'_>,
    ) -> Result<Self, PageError> {
        let has_content = def.text.is_some()
            || def.text_file.is_some()
            || def.text_handler.is_some()
            || def.background.is_some()
            || def.button.is_some();
        if !has_content {
            return Err(PageError::Empty { definition });
        }

        let text = if let Some(name) = &def.text_handler {
            if !ctx.providers.contains(name) {
                return Err(PageError::UnknownProvider {
                    definition,
                    name: name.clone(),
                });
            }
            PageText::Provider(name.clone())
        } else if let Some(file) = &def.text_file {
            let path = match ctx.base_dir {
                Some(base) => base.join(file),
                None => Path::new(file).to_path_buf(),
            };
            let source = fs::read_to_string(&path).map_err(|_| PageError::TextFile {
                definition,
                path: path.display().to_string(),
            })?;
            PageText::Template(Template::parse(&source))
        } else {
            PageText::Template(Template::parse(def.text.as_deref().unwrap_or_default()))
        };

        Ok(Self {
            index,
            name: def.name.clone().unwrap_or_else(|| format!("page{index}")),
            text,
            background: parse_background(definition, def)?,
            button: def.button.clone(),
            is_default: def.default,
        })
    }

    /// Whether the page can change without a page switch.
    ///
    /// True for templates with a variable list, provider text, and camera or
    /// handler backgrounds.
    pub const fn is_mutable(&self) -> bool {
        let text = match &self.text {
            PageText::Template(t) => t.is_mutable(),
            PageText::Provider(_) => true,
        };
        text || matches!(self.background, Background::Camera(_) | Background::Handler(_))
    }
}

fn parse_background(
    definition: usize,
    def: &PageDefinition,
) -> Result<Background, PageError> {
    let Some(kind) = &def.background else {
        return Ok(Background::None);
    };
    match kind.to_ascii_lowercase().as_str() {
        "camera" => def
            .camera_transform
            .clone()
            .map(|transform| Background::Camera(CameraSpec { transform, fov: def.fov }))
            .ok_or(PageError::MissingCameraTransform { definition }),
        "texture" => def
            .texture
            .clone()
            .map(Background::Texture)
            .ok_or(PageError::MissingTexture { definition }),
        "handler" => def
            .background_handler
            .clone()
            .map(Background::Handler)
            .ok_or(PageError::MissingBackgroundHandler { definition }),
        _ => Err(PageError::UnknownBackground {
            definition,
            kind: kind.clone(),
        }),
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Active page moved from `previous` to `current`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PageChange {
    pub previous: usize,
    pub current: usize,
}

/// Outcome of [`PageRegistry::load`].
#[derive(Debug)]
pub struct LoadReport {
    pub registry: PageRegistry,
    /// Definitions that were skipped, in config order.
    pub rejected: Vec<PageError>,
}

/// Ordered pages of one display with exactly one active.
#[derive(Clone, Debug)]
pub struct PageRegistry {
    display_id: String,
    pages: Vec<Page>,
    active: usize,
}

impl PageRegistry {
    /// Build pages from definitions and restore the active page.
    pub fn load(
        display_id: &str,
        definitions: &[PageDefinition],
        ctx: &LoadContext<'_>,
        store: &dyn PersistentStore,
    ) -> Result<LoadReport, PageError> {
        let mut pages: Vec<Page> = Vec::with_capacity(definitions.len());
        let mut rejected = Vec::new();
        for (definition, def) in definitions.iter().enumerate() {
            match Page::from_definition(pages.len(), definition, def, ctx) {
                Ok(page) => pages.push(page),
                Err(e) => {
                    log_error!("{}: {}", display_id, e);
                    rejected.push(e);
                }
            }
        }
        if pages.is_empty() {
            log_error!("{}: no valid pages", display_id);
            return Err(PageError::NoValidPages);
        }

        let persisted = store
            .get_int(display_id)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|i| *i < pages.len());
        let active = persisted
            .or_else(|| pages.iter().position(|p| p.is_default))
            .unwrap_or(0);
        log_info!("{}: {} pages, active {}", display_id, pages.len(), active);

        Ok(LoadReport {
            registry: Self {
                display_id: display_id.to_owned(),
                pages,
                active,
            },
            rejected,
        })
    }

    pub fn display_id(&self) -> &str { &self.display_id }

    pub fn pages(&self) -> &[Page] { &self.pages }

    /// Always at least 1.
    pub fn len(&self) -> usize { self.pages.len() }

    pub fn is_empty(&self) -> bool { self.pages.is_empty() }

    #[inline]
    pub const fn active_index(&self) -> usize { self.active }

    pub fn active(&self) -> &Page { &self.pages[self.active] }

    pub fn get(
        &self,
        index: usize,
    ) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Make page `index` active and persist it.
    ///
    /// Selecting the active page, or an index out of range, changes nothing.
    pub fn select(
        &mut self,
        index: usize,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        if index >= self.pages.len() {
            log_warn!("{}: no page {}", self.display_id, index);
            return None;
        }
        if index == self.active {
            return None;
        }
        let change = PageChange {
            previous: self.active,
            current: index,
        };
        self.active = index;
        if let Err(e) = store.set_int(&self.display_id, index as i64) {
            log_warn!("{}: page not saved: {}", self.display_id, e);
        }
        log_info!("{}: page {} -> {}", self.display_id, change.previous, change.current);
        Some(change)
    }

    /// First page bound to `binding`.
    pub fn by_trigger(
        &self,
        binding: &str,
    ) -> Option<&Page> {
        self.pages.iter().find(|p| p.button.as_deref() == Some(binding))
    }

    /// Select the page for a button press, cycling among shared bindings.
    pub fn press_button(
        &mut self,
        binding: &str,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        let bound: Vec<usize> = self
            .pages
            .iter()
            .filter(|p| p.button.as_deref() == Some(binding))
            .map(|p| p.index)
            .collect();
        let target = match bound.iter().position(|i| *i == self.active) {
            Some(pos) => bound[(pos + 1) % bound.len()],
            None => *bound.first()?,
        };
        self.select(target, store)
    }

    /// Select the following page, wrapping.
    pub fn next(
        &mut self,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        self.select((self.active + 1) % self.pages.len(), store)
    }

    /// Select the preceding page, wrapping.
    pub fn previous(
        &mut self,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        let len = self.pages.len();
        self.select((self.active + len - 1) % len, store)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::persistence::BlobStore;

    fn text_page(
        name: &str,
        button: Option<&str>,
    ) -> PageDefinition {
        PageDefinition {
            name: Some(name.into()),
            text: Some(format!("{name} page")),
            button: button.map(Into::into),
            ..PageDefinition::default()
        }
    }

    fn load(
        defs: &[PageDefinition],
        store: &BlobStore,
    ) -> Result<LoadReport, PageError> {
        let providers = ContentProviders::with_builtins();
        let ctx = LoadContext {
            base_dir: None,
            providers: &providers,
        };
        PageRegistry::load("mfd", defs, &ctx, store)
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl PersistentStore for ReadOnlyStore {
        fn get_int(
            &self,
            _key: &str,
        ) -> Option<i64> {
            None
        }

        fn set_int(
            &mut self,
            _key: &str,
            _value: i64,
        ) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("read-only")))
        }
    }

    fn registry(defs: &[PageDefinition]) -> PageRegistry {
        load(defs, &BlobStore::new()).unwrap().registry
    }

    #[test]
    fn test_invalid_definitions_skipped() {
        let defs = [
            text_page("a", None),
            PageDefinition::default(),
            PageDefinition {
                text_handler: Some("radar".into()),
                ..PageDefinition::default()
            },
            text_page("b", None),
        ];
        let report = load(&defs, &BlobStore::new()).unwrap();
        assert_eq!(report.registry.len(), 2);
        assert_eq!(report.registry.pages()[1].name, "b");
        assert_eq!(report.registry.pages()[1].index, 1);
        assert_eq!(
            report.rejected,
            vec![
                PageError::Empty { definition: 1 },
                PageError::UnknownProvider {
                    definition: 2,
                    name: "radar".into(),
                },
            ]
        );
    }

    #[test]
    fn test_no_valid_pages() {
        let defs = [PageDefinition::default()];
        assert!(matches!(load(&defs, &BlobStore::new()), Err(PageError::NoValidPages)));
        assert!(matches!(load(&[], &BlobStore::new()), Err(PageError::NoValidPages)));
    }

    #[test]
    fn test_background_validation() {
        let with_bg = |kind: &str| PageDefinition {
            background: Some(kind.into()),
            ..PageDefinition::default()
        };
        let providers = ContentProviders::new();
        let ctx = LoadContext {
            base_dir: None,
            providers: &providers,
        };
        let err = |def: PageDefinition| Page::from_definition(0, 4, &def, &ctx).err();
        assert_eq!(err(with_bg("camera")), Some(PageError::MissingCameraTransform { definition: 4 }));
        assert_eq!(err(with_bg("texture")), Some(PageError::MissingTexture { definition: 4 }));
        assert_eq!(err(with_bg("handler")), Some(PageError::MissingBackgroundHandler { definition: 4 }));
        assert_eq!(
            err(with_bg("video")),
            Some(PageError::UnknownBackground {
                definition: 4,
                kind: "video".into(),
            })
        );

        let camera = PageDefinition {
            camera_transform: Some("NavCam".into()),
            fov: Some(40.0),
            ..with_bg("camera")
        };
        let page = Page::from_definition(0, 0, &camera, &ctx).unwrap();
        assert_eq!(
            page.background,
            Background::Camera(CameraSpec {
                transform: "NavCam".into(),
                fov: Some(40.0),
            })
        );
        assert!(page.is_mutable(), "Camera feed changes without a page switch");
    }

    #[test]
    fn test_missing_text_file_rejected() {
        let def = PageDefinition {
            text_file: Some("does/not/exist.txt".into()),
            ..PageDefinition::default()
        };
        let report = load(&[def, text_page("ok", None)], &BlobStore::new()).unwrap();
        assert!(matches!(report.rejected[0], PageError::TextFile { definition: 0, .. }));
    }

    #[test]
    fn test_text_file_relative_to_base_dir() {
        let dir = std::env::temp_dir().join(format!("cockpit-mfd-pages-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("orbit.txt"), "AP {0}$&$APOAPSIS").unwrap();

        let providers = ContentProviders::new();
        let ctx = LoadContext {
            base_dir: Some(dir.as_path()),
            providers: &providers,
        };
        let def = PageDefinition {
            text_file: Some("orbit.txt".into()),
            ..PageDefinition::default()
        };
        let page = Page::from_definition(0, 0, &def, &ctx).unwrap();
        assert!(page.is_mutable());
        assert_eq!(page.name, "page0");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_initial_page_priority() {
        let mut defs = vec![text_page("a", None), text_page("b", None), text_page("c", None)];
        assert_eq!(registry(&defs).active_index(), 0);

        defs[2].default = true;
        assert_eq!(registry(&defs).active_index(), 2);

        let store = BlobStore::from_blob("mfd$1");
        assert_eq!(load(&defs, &store).unwrap().registry.active_index(), 1);

        let store = BlobStore::from_blob("mfd$9");
        assert_eq!(load(&defs, &store).unwrap().registry.active_index(), 2);

        let store = BlobStore::from_blob("mfd$-1");
        assert_eq!(load(&defs, &store).unwrap().registry.active_index(), 2);
    }

    #[test]
    fn test_select_persists_and_is_idempotent() {
        let defs = [text_page("a", None), text_page("b", None)];
        let mut store = BlobStore::new();
        let mut pages = load(&defs, &store).unwrap().registry;

        assert_eq!(pages.select(0, &mut store), None);
        assert_eq!(store.blob(), "");

        assert_eq!(pages.select(1, &mut store), Some(PageChange { previous: 0, current: 1 }));
        assert_eq!(store.get_int("mfd"), Some(1));
        assert_eq!(pages.active().name, "b");

        assert_eq!(pages.select(5, &mut store), None);
        assert_eq!(pages.active_index(), 1);
    }

    #[test]
    fn test_select_survives_store_failure() {
        let defs = [text_page("a", Some("B1")), text_page("b", Some("B1"))];
        let mut pages = registry(&defs);
        let mut store = ReadOnlyStore;

        assert_eq!(pages.select(1, &mut store), Some(PageChange { previous: 0, current: 1 }));
        assert_eq!(pages.active().name, "b", "Page changes even when it cannot be saved");
        assert_eq!(pages.press_button("B1", &mut store), Some(PageChange { previous: 1, current: 0 }));
    }

    #[test]
    fn test_persisted_page_round_trip() {
        let defs = [text_page("a", None), text_page("b", None), text_page("c", None)];
        for k in 0..defs.len() {
            let mut store = BlobStore::new();
            let mut pages = load(&defs, &store).unwrap().registry;
            pages.select(k, &mut store);
            assert_eq!(load(&defs, &store).unwrap().registry.active_index(), k);
        }
    }

    #[test]
    fn test_shared_button_cycles() {
        let defs = [
            text_page("a", Some("B1")),
            text_page("b", Some("B2")),
            text_page("c", Some("B1")),
            text_page("d", Some("B1")),
        ];
        let mut store = BlobStore::new();
        let mut pages = load(&defs, &store).unwrap().registry;
        assert_eq!(pages.by_trigger("B1").map(|p| p.index), Some(0));

        pages.press_button("B2", &mut store);
        assert_eq!(pages.active_index(), 1);
        // Active page not bound to B1: first B1 page.
        pages.press_button("B1", &mut store);
        assert_eq!(pages.active_index(), 0);
        pages.press_button("B1", &mut store);
        assert_eq!(pages.active_index(), 2);
        pages.press_button("B1", &mut store);
        assert_eq!(pages.active_index(), 3);
        pages.press_button("B1", &mut store);
        assert_eq!(pages.active_index(), 0);

        assert_eq!(pages.press_button("B9", &mut store), None);
        // A lone binding on the active page is a no-op.
        pages.press_button("B2", &mut store);
        assert_eq!(pages.press_button("B2", &mut store), None);
    }

    #[test]
    fn test_next_previous_wrap() {
        let defs = [text_page("a", None), text_page("b", None), text_page("c", None)];
        let mut store = BlobStore::new();
        let mut pages = load(&defs, &store).unwrap().registry;
        pages.previous(&mut store);
        assert_eq!(pages.active_index(), 2);
        pages.next(&mut store);
        assert_eq!(pages.active_index(), 0);
    }

    #[test]
    fn test_handler_text_wins_and_is_mutable() {
        let def = PageDefinition {
            text: Some("ignored".into()),
            text_handler: Some("log_viewer".into()),
            ..PageDefinition::default()
        };
        let pages = registry(&[def]);
        assert_eq!(pages.active().text, PageText::Provider("log_viewer".into()));
        assert!(pages.active().is_mutable());
    }

    #[test]
    fn test_button_only_page_is_valid() {
        let def = PageDefinition {
            button: Some("B3".into()),
            ..PageDefinition::default()
        };
        let pages = registry(&[def]);
        assert_eq!(pages.active().text, PageText::Template(Template::parse("")));
    }
}
