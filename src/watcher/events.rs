use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::Event;
use std::path::PathBuf;

/// What a filesystem event means for the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// The file was created or written: reload it.
    Upsert(PathBuf),
    /// The file is gone under this name: drop its entry.
    Remove(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileChange::Upsert(path) | FileChange::Remove(path) => path,
        }
    }
}

/// Translate a notify event into index changes, in path order.
pub fn changes_for(event: &Event) -> Vec<FileChange> {
    let paths = event.paths.iter().cloned();

    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            paths.map(FileChange::Upsert).collect()
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.map(FileChange::Remove).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths.map(FileChange::Upsert).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => paths
            .enumerate()
            .map(|(i, path)| {
                if i == 0 {
                    FileChange::Remove(path)
                } else {
                    FileChange::Upsert(path)
                }
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|path| {
                if path.exists() {
                    FileChange::Upsert(path)
                } else {
                    FileChange::Remove(path)
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
    }

    #[test]
    fn test_create_and_write_upsert() {
        let created = event(EventKind::Create(CreateKind::File), &["/r/Bread.md"]);
        assert_eq!(
            changes_for(&created),
            vec![FileChange::Upsert("/r/Bread.md".into())]
        );

        let written = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/r/Bread.md"],
        );
        assert_eq!(
            changes_for(&written),
            vec![FileChange::Upsert("/r/Bread.md".into())]
        );
    }

    #[test]
    fn test_remove_and_rename_from_delete() {
        let removed = event(EventKind::Remove(RemoveKind::File), &["/r/Bread.md"]);
        assert_eq!(
            changes_for(&removed),
            vec![FileChange::Remove("/r/Bread.md".into())]
        );

        let renamed = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/r/Bread.md"],
        );
        assert_eq!(
            changes_for(&renamed),
            vec![FileChange::Remove("/r/Bread.md".into())]
        );
    }

    #[test]
    fn test_rename_both_moves_entry() {
        let renamed = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/r/Bread.md", "/r/Rye Bread.md"],
        );
        assert_eq!(
            changes_for(&renamed),
            vec![
                FileChange::Remove("/r/Bread.md".into()),
                FileChange::Upsert("/r/Rye Bread.md".into()),
            ]
        );
    }

    #[test]
    fn test_metadata_and_access_ignored() {
        let touched = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            &["/r/Bread.md"],
        );
        assert!(changes_for(&touched).is_empty());
        assert!(changes_for(&event(EventKind::Any, &["/r/Bread.md"])).is_empty());
    }
}
