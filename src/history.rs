use chrono::Local;

use crate::models::{Role, UpdateHistoryEntry};

/// Editor focus for a candidate's timeline. One explicit state instead of
/// a pile of booleans: at most one entry is in edit mode, and a save in
/// flight blocks a second submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Viewing,
    Editing(usize),
    Saving,
}

/// Local copy of a candidate's update history. Mutations are applied only
/// after the server has acknowledged the corresponding call, so local and
/// server state cannot diverge on failure; entries are never reordered.
#[derive(Debug)]
pub struct HistoryEditor {
    entries: Vec<UpdateHistoryEntry>,
    mode: EditorMode,
}

impl HistoryEditor {
    pub fn new(entries: Vec<UpdateHistoryEntry>) -> Self {
        Self {
            entries,
            mode: EditorMode::Viewing,
        }
    }

    pub fn entries(&self) -> &[UpdateHistoryEntry] {
        &self.entries
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Enter edit mode for the entry at `idx`. Editing is exclusive; only
    /// possible while viewing and for an entry that exists.
    pub fn begin_edit(&mut self, idx: usize) -> bool {
        if self.mode == EditorMode::Viewing && idx < self.entries.len() {
            self.mode = EditorMode::Editing(idx);
            true
        } else {
            false
        }
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.mode, EditorMode::Editing(_)) {
            self.mode = EditorMode::Viewing;
        }
    }

    /// Guard around any server call. Returns false while a save is already
    /// in flight, making a double submission a no-op instead of a
    /// duplicate request.
    pub fn begin_save(&mut self) -> bool {
        if self.mode == EditorMode::Saving {
            return false;
        }
        self.mode = EditorMode::Saving;
        true
    }

    pub fn finish_save(&mut self) {
        self.mode = EditorMode::Viewing;
    }

    /// Append an acknowledged entry. `points` continues the sequence and
    /// the date is stamped now; the server-assigned id arrives only on the
    /// next full reload.
    pub fn apply_added(
        &mut self,
        notes: &str,
        role: Role,
        author: &str,
        company: Option<&str>,
    ) -> &UpdateHistoryEntry {
        let entry = UpdateHistoryEntry {
            id: None,
            points: self.entries.len() as u32 + 1,
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            updated_by_role: role,
            updated_by_name: author.to_string(),
            company_name: company.map(str::to_string),
            notes: notes.to_string(),
            comments: Vec::new(),
        };
        self.entries.push(entry);
        self.entries.last().expect("just pushed")
    }

    /// Rewrite the notes of the entry matching `entry_id`. Everything else
    /// on the entry is left untouched. Returns false when no entry
    /// matches.
    pub fn apply_edited(&mut self, entry_id: &str, notes: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(entry_id))
        {
            Some(entry) => {
                entry.notes = notes.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove the entry matching `entry_id`, leaving the order of the rest
    /// unchanged. Returns false when no entry matches.
    pub fn apply_deleted(&mut self, entry_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id.as_deref() != Some(entry_id));
        self.entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, points: u32, notes: &str) -> UpdateHistoryEntry {
        UpdateHistoryEntry {
            id: Some(id.to_string()),
            points,
            date: "2025-12-01".to_string(),
            updated_by_role: Role::Employer,
            updated_by_name: "Acme".to_string(),
            company_name: Some("Acme".to_string()),
            notes: notes.to_string(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_apply_added_extends_sequence() {
        let mut editor = HistoryEditor::new(vec![entry("a", 1, "first"), entry("b", 2, "second")]);
        let added = editor.apply_added("third", Role::Admin, "Ops", None);
        assert_eq!(added.points, 3);
        assert!(added.id.is_none());
        assert_eq!(added.updated_by_role, Role::Admin);
        assert_eq!(editor.entries().len(), 3);
    }

    #[test]
    fn test_apply_edited_changes_only_notes() {
        let mut editor = HistoryEditor::new(vec![entry("a", 1, "first"), entry("b", 2, "second")]);
        assert!(editor.apply_edited("b", "revised"));

        let e = &editor.entries()[1];
        assert_eq!(e.notes, "revised");
        assert_eq!(e.points, 2);
        assert_eq!(e.date, "2025-12-01");
        assert_eq!(e.updated_by_role, Role::Employer);

        assert!(!editor.apply_edited("missing", "x"));
    }

    #[test]
    fn test_apply_deleted_removes_exactly_one() {
        let mut editor =
            HistoryEditor::new(vec![entry("a", 1, "one"), entry("b", 2, "two"), entry("c", 3, "three")]);
        assert!(editor.apply_deleted("b"));
        let ids: Vec<&str> = editor
            .entries()
            .iter()
            .filter_map(|e| e.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        assert!(!editor.apply_deleted("b"));
        assert_eq!(editor.entries().len(), 2);
    }

    #[test]
    fn test_edit_mode_is_exclusive() {
        let mut editor = HistoryEditor::new(vec![entry("a", 1, "one"), entry("b", 2, "two")]);
        assert!(editor.begin_edit(0));
        assert_eq!(editor.mode(), EditorMode::Editing(0));
        // Already editing: a second edit does not take over
        assert!(!editor.begin_edit(1));

        editor.cancel_edit();
        assert_eq!(editor.mode(), EditorMode::Viewing);
        assert!(editor.begin_edit(1));
    }

    #[test]
    fn test_begin_edit_rejects_bad_index() {
        let mut editor = HistoryEditor::new(vec![entry("a", 1, "one")]);
        assert!(!editor.begin_edit(5));
        assert_eq!(editor.mode(), EditorMode::Viewing);
    }

    #[test]
    fn test_double_save_is_noop() {
        let mut editor = HistoryEditor::new(Vec::new());
        assert!(editor.begin_save());
        // Second submission while saving must not go through
        assert!(!editor.begin_save());
        editor.finish_save();
        assert!(editor.begin_save());
    }
}
