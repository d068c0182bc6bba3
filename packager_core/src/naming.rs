//! Package file naming
//!
//! Dissemination packages are named `<TYPE>@<handle>.<ext>` with the handle's
//! `/` replaced by `-`, e.g. `ITEM@123456789-7.json`. The same convention lets
//! a replace run recover the target handle from a file name.

use crate::model::{ObjectType, RepositoryObject};
use std::path::Path;

/// Extension of packages written by the built-in packager
pub const PACKAGE_EXTENSION: &str = "json";

const TYPE_LABELS: [ObjectType; 4] = [
    ObjectType::Site,
    ObjectType::Community,
    ObjectType::Collection,
    ObjectType::Item,
];

/// File name of the package for `object`
pub fn package_file_name(object: &RepositoryObject, extension: &str) -> String {
    let identifier = if object.handle.is_empty() {
        format!("internal-id-{}", object.id)
    } else {
        object.handle.replace('/', "-")
    };
    format!("{}@{}.{}", object.kind.label(), identifier, extension)
}

/// Handle encoded in a package file name, if the name follows the convention
///
/// Anything before the type label is ignored, so `export_ITEM@123456-7.json`
/// yields `123456/7`.
pub fn handle_from_package_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;

    let encoded = TYPE_LABELS.iter().find_map(|kind| {
        let marker = format!("{}@", kind.label());
        stem.find(&marker).map(|at| &stem[at + marker.len()..])
    })?;

    if encoded.is_empty() || encoded.starts_with("internal-id-") {
        return None;
    }

    Some(encoded.replacen('-', "/", 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn object(kind: ObjectType, handle: &str, id: u64) -> RepositoryObject {
        RepositoryObject {
            id,
            handle: handle.to_string(),
            kind,
            name: "Test".to_string(),
            parent: None,
            in_workflow: false,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_package_file_name() {
        let item = object(ObjectType::Item, "123456789/7", 7);
        assert_eq!(
            package_file_name(&item, PACKAGE_EXTENSION),
            "ITEM@123456789-7.json"
        );
    }

    #[test]
    fn test_package_file_name_without_handle() {
        let collection = object(ObjectType::Collection, "", 12);
        assert_eq!(
            package_file_name(&collection, "zip"),
            "COLLECTION@internal-id-12.zip"
        );
    }

    #[test]
    fn test_handle_from_package_name() {
        let cases = [
            ("ITEM@123456-7.json", Some("123456/7")),
            ("/exports/COMMUNITY@10673-1.json", Some("10673/1")),
            ("export_ITEM@123456-7.zip", Some("123456/7")),
            ("COLLECTION@internal-id-4.json", None),
            ("ITEM@.json", None),
            ("thesis.json", None),
        ];

        for (name, expected) in cases {
            assert_eq!(
                handle_from_package_name(&PathBuf::from(name)).as_deref(),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn test_handle_suffix_may_contain_dashes() {
        let path = PathBuf::from("ITEM@123456-thesis-2024.json");
        assert_eq!(
            handle_from_package_name(&path).as_deref(),
            Some("123456/thesis-2024")
        );
    }
}
