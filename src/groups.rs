//! Sibling-group construction and allocation ordering.

use std::collections::BTreeMap;

use crate::paths::{ContainerPath, DocClass};

/// One record annotated with its parsed path tokens and class, carrying the
/// index of its row in the source table.
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    /// Row index in the source table.
    pub row: usize,
    /// Full raw path string, the tie-break sort key inside a bucket.
    pub path: String,
    /// Parsed container tokens.
    pub container: ContainerPath,
    /// Document-type precedence bucket.
    pub class: DocClass,
}

/// An allocation unit: records sharing an immediate container scope, already
/// arranged in allocation order (Primary, then Secondary, then Other, each
/// bucket ascending by path).
#[derive(Debug)]
pub struct Group {
    /// Archive the group belongs to.
    pub archive: String,
    /// Folder name, empty for a root-of-archive group.
    pub folder: String,
    /// Members in allocation order.
    pub members: Vec<ParsedRecord>,
}

impl Group {
    /// Whether this group sits at the root of its archive rather than in a
    /// folder. Root groups get numbers but never family propagation.
    pub fn is_archive_root(&self) -> bool {
        self.folder.is_empty()
    }
}

/// Partition archive-scoped records into ordered groups.
///
/// In-folder groups come first, in ascending (archive, folder) order;
/// root-of-archive groups follow, one per archive in ascending archive
/// order. Records outside any archive are not represented at all. The
/// returned ordering is the sole ordering input to sequence allocation and
/// is a pure function of the input records.
pub fn build_groups(records: Vec<ParsedRecord>) -> Vec<Group> {
    let mut in_folder: BTreeMap<(String, String), Vec<ParsedRecord>> = BTreeMap::new();
    let mut at_root: BTreeMap<String, Vec<ParsedRecord>> = BTreeMap::new();

    for record in records {
        if !record.container.in_archive() {
            continue;
        }
        let archive = record.container.archive.clone();
        if record.container.folder.is_empty() {
            at_root.entry(archive).or_default().push(record);
        } else {
            let folder = record.container.folder.clone();
            in_folder.entry((archive, folder)).or_default().push(record);
        }
    }

    let mut groups = Vec::with_capacity(in_folder.len() + at_root.len());
    for ((archive, folder), members) in in_folder {
        groups.push(Group {
            archive,
            folder,
            members: order_members(members),
        });
    }
    for (archive, members) in at_root {
        groups.push(Group {
            archive,
            folder: String::new(),
            members: order_members(members),
        });
    }
    groups
}

/// Arrange group members in allocation order: class precedence first, then
/// full path ascending. Stable and total, so identical input reproduces
/// identical numbering.
fn order_members(mut members: Vec<ParsedRecord>) -> Vec<ParsedRecord> {
    members.sort_by(|a, b| a.class.cmp(&b.class).then_with(|| a.path.cmp(&b.path)));
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, path: &str, primary: &str, secondary: &str) -> ParsedRecord {
        let container = ContainerPath::parse(path);
        let class = DocClass::classify(&container.filename, primary, secondary);
        ParsedRecord {
            row,
            path: path.to_string(),
            container,
            class,
        }
    }

    fn class_order(group: &Group) -> Vec<DocClass> {
        group.members.iter().map(|m| m.class).collect()
    }

    #[test]
    fn folder_groups_precede_root_groups() {
        let groups = build_groups(vec![
            record(0, "b.zip//loose.txt", "FE", "Civmec"),
            record(1, "a.zip///F1/doc.pdf", "FE", "Civmec"),
            record(2, "b.zip///F2/doc.pdf", "FE", "Civmec"),
        ]);
        let keys: Vec<(&str, &str)> = groups
            .iter()
            .map(|g| (g.archive.as_str(), g.folder.as_str()))
            .collect();
        assert_eq!(keys, vec![("a.zip", "F1"), ("b.zip", "F2"), ("b.zip", "")]);
        assert!(groups[2].is_archive_root());
    }

    #[test]
    fn no_archive_records_are_excluded() {
        let groups = build_groups(vec![record(0, "plain/file.pdf", "FE", "Civmec")]);
        assert!(groups.is_empty());
    }

    #[test]
    fn buckets_order_primary_secondary_other() {
        let groups = build_groups(vec![
            record(0, "a.zip///F/zzz.txt", "FE", "Civmec"),
            record(1, "a.zip///F/Civmec 1.pdf", "FE", "Civmec"),
            record(2, "a.zip///F/FE 9.pdf", "FE", "Civmec"),
            record(3, "a.zip///F/FE 1.pdf", "FE", "Civmec"),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            class_order(&groups[0]),
            vec![
                DocClass::Primary,
                DocClass::Primary,
                DocClass::Secondary,
                DocClass::Other
            ]
        );
        // Within the Primary bucket, ascending full path.
        assert_eq!(groups[0].members[0].row, 3);
        assert_eq!(groups[0].members[1].row, 2);
    }

    #[test]
    fn group_keys_sort_ascending() {
        let groups = build_groups(vec![
            record(0, "a.zip///B/x.pdf", "FE", "Civmec"),
            record(1, "a.zip///A/x.pdf", "FE", "Civmec"),
        ]);
        assert_eq!(groups[0].folder, "A");
        assert_eq!(groups[1].folder, "B");
    }
}
