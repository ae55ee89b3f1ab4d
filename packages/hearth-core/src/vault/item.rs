//! Vault item records.

use serde::{Deserialize, Serialize};

use crate::crypto::SealedPayload;
use crate::error::{Error, Result};

/// What a vault item holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultItemKind {
    /// Login credentials
    Password,
    /// Free-form secure note
    Note,
    /// Reference to an uploaded document
    Document,
}

/// One stored secret
///
/// The secret itself only exists as `sealed`; everything else is plaintext
/// metadata the UI can show without the PIN.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    /// Unique identifier
    pub id: String,
    /// Owning hub
    pub hub_id: String,
    /// Ciphertext, salt and IV
    #[serde(flatten)]
    pub sealed: SealedPayload,
    /// Display title
    pub title: String,
    /// Item category
    pub kind: VaultItemKind,
    /// User tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Pinned to the top of the list
    #[serde(default)]
    pub favorite: bool,
    /// Storage path of an attached file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ref: Option<String>,
    /// Creation time (Unix millis)
    pub created_at: i64,
    /// Last modification time (Unix millis)
    pub updated_at: i64,
}

/// Metadata for an item about to be created
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewVaultItem {
    /// Owning hub
    pub hub_id: String,
    /// Display title
    pub title: String,
    /// Item category
    pub kind: VaultItemKind,
    /// User tags
    pub tags: Vec<String>,
    /// Pinned flag
    pub favorite: bool,
    /// Attached file
    pub file_ref: Option<String>,
}

impl NewVaultItem {
    /// Minimal item with no tags, not favorited, no file
    pub fn new(hub_id: impl Into<String>, title: impl Into<String>, kind: VaultItemKind) -> Self {
        Self {
            hub_id: hub_id.into(),
            title: title.into(),
            kind,
            tags: Vec::new(),
            favorite: false,
            file_ref: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.hub_id.trim().is_empty() {
            return Err(Error::InvalidVaultItem("hub id is required".into()));
        }
        validate_title(&self.title)
    }
}

/// Partial metadata update; `None` leaves a field unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VaultItemUpdate {
    /// New title
    pub title: Option<String>,
    /// Replacement tag list
    pub tags: Option<Vec<String>>,
    /// New favorite flag
    pub favorite: Option<bool>,
    /// `Some(None)` detaches the file
    pub file_ref: Option<Option<String>>,
}

impl VaultItemUpdate {
    pub(crate) fn apply(self, item: &mut VaultItem) -> Result<()> {
        if let Some(title) = self.title {
            validate_title(&title)?;
            item.title = title;
        }
        if let Some(tags) = self.tags {
            item.tags = tags;
        }
        if let Some(favorite) = self.favorite {
            item.favorite = favorite;
        }
        if let Some(file_ref) = self.file_ref {
            item.file_ref = file_ref;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidVaultItem("title is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> VaultItem {
        VaultItem {
            id: "item-1".into(),
            hub_id: "hub-1".into(),
            sealed: SealedPayload {
                ciphertext: "Y3Q=".into(),
                salt: "c2FsdA==".into(),
                iv: "aXY=".into(),
            },
            title: "Wi-Fi".into(),
            kind: VaultItemKind::Password,
            tags: vec!["home".into()],
            favorite: true,
            file_ref: None,
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn test_persisted_shape() {
        let json = serde_json::to_value(sample_item()).unwrap();

        // Sealed fields sit next to the metadata, not nested
        assert_eq!(json["ciphertext"], "Y3Q=");
        assert_eq!(json["salt"], "c2FsdA==");
        assert_eq!(json["iv"], "aXY=");
        assert_eq!(json["hubId"], "hub-1");
        assert_eq!(json["kind"], "password");
        assert!(json.get("fileRef").is_none());
        assert!(json.get("sealed").is_none());

        let back: VaultItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_item());
    }

    #[test]
    fn test_new_item_validation() {
        assert!(NewVaultItem::new("hub", "title", VaultItemKind::Note)
            .validate()
            .is_ok());
        assert!(NewVaultItem::new("", "title", VaultItemKind::Note)
            .validate()
            .is_err());
        assert!(NewVaultItem::new("hub", "  ", VaultItemKind::Note)
            .validate()
            .is_err());
    }

    #[test]
    fn test_update_apply() {
        let mut item = sample_item();
        let update = VaultItemUpdate {
            title: Some("Router".into()),
            favorite: Some(false),
            file_ref: Some(Some("files/router.pdf".into())),
            ..Default::default()
        };

        update.apply(&mut item).unwrap();

        assert_eq!(item.title, "Router");
        assert!(!item.favorite);
        assert_eq!(item.tags, vec!["home".to_string()]);
        assert_eq!(item.file_ref.as_deref(), Some("files/router.pdf"));
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let mut item = sample_item();
        let update = VaultItemUpdate {
            title: Some(String::new()),
            ..Default::default()
        };

        assert!(update.apply(&mut item).is_err());
        assert_eq!(item.title, "Wi-Fi");
    }
}
