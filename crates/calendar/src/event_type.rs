//! Event types ("seminar", "social", ...) and their color schemes.

use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, DomainResult, Entity};

eventdesk_core::typed_id!(TypeColorSetId);
eventdesk_core::typed_id!(EventTypeId);

const MAX_COLOR_LEN: usize = 20;
const MAX_TYPE_NAME_LEN: usize = 50;

/// Colors of a type, stored without the leading `#` (hex digits or a color name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeColorSet {
    pub id: TypeColorSetId,
    pub fg_color: String,
    pub bg_color: String,
    pub border_color: String,
}

impl TypeColorSet {
    pub fn new(
        id: TypeColorSetId,
        fg_color: impl Into<String>,
        bg_color: impl Into<String>,
        border_color: impl Into<String>,
    ) -> DomainResult<Self> {
        let set = Self {
            id,
            fg_color: fg_color.into(),
            bg_color: bg_color.into(),
            border_color: border_color.into(),
        };
        for (field, value) in [
            ("fg_color", &set.fg_color),
            ("bg_color", &set.bg_color),
            ("border_color", &set.border_color),
        ] {
            if value.is_empty() || value.len() > MAX_COLOR_LEN {
                return Err(DomainError::validation(format!(
                    "{field} must be 1..={MAX_COLOR_LEN} characters"
                )));
            }
        }
        Ok(set)
    }
}

impl core::fmt::Display for TypeColorSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} #{}", self.id, self.bg_color)
    }
}

impl Entity for TypeColorSet {
    type Id = TypeColorSetId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Grouping of events. An event has at most one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub id: EventTypeId,
    name: String,
    slug: String,
    pub color_set: TypeColorSet,
}

impl EventType {
    pub fn new(id: EventTypeId, name: impl Into<String>, color_set: TypeColorSet) -> DomainResult<Self> {
        let mut ty = Self {
            id,
            name: String::new(),
            slug: String::new(),
            color_set,
        };
        ty.rename(name)?;
        Ok(ty)
    }

    /// Change the name; the slug always follows it.
    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("type name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TYPE_NAME_LEN {
            return Err(DomainError::validation(format!(
                "type name cannot exceed {MAX_TYPE_NAME_LEN} characters"
            )));
        }
        self.slug = slugify(trimmed);
        self.name = trimmed.to_string();
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn fg_color(&self) -> String {
        format!("#{}", self.color_set.fg_color)
    }

    pub fn bg_color(&self) -> String {
        format!("#{}", self.color_set.bg_color)
    }

    pub fn border_color(&self) -> String {
        format!("#{}", self.color_set.border_color)
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Entity for EventType {
    type Id = EventTypeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// URL slug: lowercase ASCII alphanumerics, `_` and single hyphens.
///
/// Non-ASCII characters are dropped; runs of whitespace or hyphens collapse into
/// one hyphen; leading/trailing hyphens are stripped.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }

    slug
}
