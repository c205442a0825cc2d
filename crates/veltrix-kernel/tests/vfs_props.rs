//! Property tests: tree invariants hold after any sequence of operations.

use proptest::prelude::*;
use veltrix_kernel::import::ImportPayload;
use veltrix_kernel::language::classify;
use veltrix_kernel::{DecodedImport, EntryKind, Language, Vfs};

#[derive(Debug, Clone)]
enum Op {
    Create(String, EntryKind),
    Delete(usize),
    Duplicate(usize),
    Rename(usize, String),
    SetActive(usize),
    Edit(usize, String),
    Import(String),
}

fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("index.html".to_string()),
        Just("app.js".to_string()),
        Just("app-copy.js".to_string()),
        Just("style.css".to_string()),
        Just("logo.png".to_string()),
        Just("notes".to_string()),
        Just(" padded.txt ".to_string()),
        Just("".to_string()),
        "[a-c]{1,3}(\\.(js|css|png))?",
    ]
}

fn kind() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::File), Just(EntryKind::Folder)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (name(), kind()).prop_map(|(n, k)| Op::Create(n, k)),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => any::<usize>().prop_map(Op::Duplicate),
        1 => (any::<usize>(), name()).prop_map(|(i, n)| Op::Rename(i, n)),
        1 => any::<usize>().prop_map(Op::SetActive),
        1 => (any::<usize>(), "[a-z<>/]{0,12}").prop_map(|(i, t)| Op::Edit(i, t)),
        2 => name().prop_map(Op::Import),
    ]
}

/// Apply one operation, ignoring rejections.
fn apply(vfs: &mut Vfs, op: &Op) {
    let pick = |vfs: &Vfs, i: usize| {
        let entries = vfs.entries();
        (!entries.is_empty()).then(|| entries[i % entries.len()].id.clone())
    };
    match op {
        Op::Create(name, kind) => {
            let _ = vfs.create(name, *kind);
        }
        Op::Delete(i) => {
            if let Some(id) = pick(vfs, *i) {
                let _ = vfs.delete(&id);
            }
        }
        Op::Duplicate(i) => {
            if let Some(id) = pick(vfs, *i) {
                let _ = vfs.duplicate(&id);
            }
        }
        Op::Rename(i, name) => {
            if let Some(id) = pick(vfs, *i) {
                let _ = vfs.rename(&id, name);
            }
        }
        Op::SetActive(i) => {
            if let Some(id) = pick(vfs, *i) {
                let _ = vfs.set_active(&id);
            }
        }
        Op::Edit(i, text) => {
            if let Some(id) = pick(vfs, *i) {
                let _ = vfs.set_content(&id, text);
            }
        }
        Op::Import(name) => {
            if let Some(decoded) = decoded(name) {
                vfs.insert_import(decoded);
            }
        }
    }
}

/// What the decoder would hand back for an upload called `name`.
fn decoded(name: &str) -> Option<DecodedImport> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let language = classify(name);
    let payload = if language == Language::Image {
        ImportPayload::DataUrl("data:image/png;base64,".to_string())
    } else {
        ImportPayload::Text(format!("// {name}"))
    };
    Some(DecodedImport {
        name: name.to_string(),
        language,
        payload,
    })
}

proptest! {
    #[test]
    fn invariants_hold_after_any_sequence(ops in prop::collection::vec(op(), 0..40)) {
        let mut vfs = Vfs::default();
        for op in &ops {
            apply(&mut vfs, op);
            let state = vfs.state();
            prop_assert!(state.names_are_unique(), "duplicate names after {:?}", op);
            prop_assert!(state.active_is_valid(), "dangling active after {:?}", op);
            prop_assert!(state.files.iter().all(|e| e.has_consistent_shape()));
            prop_assert!(state.files.iter().all(|e| !e.name.trim().is_empty()));
        }
    }

    #[test]
    fn imports_never_collide_and_become_active(
        setup in prop::collection::vec(op(), 0..20),
        upload in name(),
    ) {
        let mut vfs = Vfs::default();
        for op in &setup {
            apply(&mut vfs, op);
        }
        if let Some(decoded) = decoded(&upload) {
            let before = vfs.entries().len();
            let entry = vfs.insert_import(decoded);
            prop_assert_eq!(vfs.entries().len(), before + 1);
            prop_assert_eq!(vfs.active_id(), Some(&entry.id));
            prop_assert!(vfs.state().names_are_unique());
            prop_assert!(entry.has_consistent_shape());
        }
    }

    #[test]
    fn rejected_operations_leave_the_tree_untouched(
        setup in prop::collection::vec(op(), 0..20),
        last in op(),
    ) {
        let mut vfs = Vfs::default();
        for op in &setup {
            apply(&mut vfs, op);
        }
        let before = vfs.clone();
        let rejected = match &last {
            Op::Create(name, kind) => vfs.create(name, *kind).is_err(),
            Op::Rename(i, name) if !vfs.entries().is_empty() => {
                let id = vfs.entries()[i % vfs.entries().len()].id.clone();
                vfs.rename(&id, name).is_err()
            }
            _ => false,
        };
        if rejected {
            prop_assert_eq!(vfs, before);
        }
    }
}
