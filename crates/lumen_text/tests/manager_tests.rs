//! Font manager resolution, load completion and teardown

mod common;

use common::{init_tracing, ManualLoader, RecordingContext, TEST_FONT};
use lumen_core::{lock, TaskQueue};
use lumen_text::{FontConfig, FontManager, LoadOutcome, ResourceStatus, SharedFont};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn fonts_dir() -> TempDir {
    init_tracing();
    tempfile::tempdir().unwrap()
}

fn manager(dir: &Path) -> FontManager {
    let config = FontConfig::default()
        .with_fonts_dir(dir)
        .with_system_fallback(false);
    FontManager::new(config, TaskQueue::new())
}

fn install_font(dir: &Path, name: &str) -> String {
    let path = dir.join(format!("{}.ttf", name));
    std::fs::write(&path, TEST_FONT).unwrap();
    path.to_string_lossy().into_owned()
}

/// Records every outcome the font reports
fn watch(font: &SharedFont) -> Arc<Mutex<Vec<LoadOutcome>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    lock(font).on_ready(move |outcome| sink.lock().unwrap().push(outcome));
    seen
}

fn outcomes(seen: &Arc<Mutex<Vec<LoadOutcome>>>) -> Vec<LoadOutcome> {
    seen.lock().unwrap().clone()
}

/// A `<fonts_dir>/<name>.ttf` file is used instead of the name itself
#[test]
fn test_local_font_preferred() {
    let dir = fonts_dir();
    let local = install_font(dir.path(), "abc");
    let loader = ManualLoader::new();
    let manager = manager(dir.path()).with_loader(loader.clone());

    let font = manager.get_font("abc");
    assert_eq!(lock(&font).url(), local);
    assert!(lock(&font).is_initialized());
    assert_eq!(lock(&font).status(), ResourceStatus::Ok);
    assert_eq!(loader.pending(), 0);

    let again = manager.get_font("abc");
    assert!(Arc::ptr_eq(&font, &again));
    assert_eq!(manager.font_count(), 1);
}

#[test]
fn test_load_resolves_on_task_drain() {
    let dir = fonts_dir();
    install_font(dir.path(), "abc");
    let manager = manager(dir.path());

    let font = manager.get_font("abc");
    let seen = watch(&font);
    assert!(outcomes(&seen).is_empty());

    assert_eq!(manager.task_queue().run_pending(), 1);
    assert_eq!(outcomes(&seen), vec![LoadOutcome::Resolved]);
    assert_eq!(lock(&font).pixel_size(), 16);
}

#[test]
fn test_missing_file_is_rejected() {
    let dir = fonts_dir();
    let manager = manager(dir.path());
    let missing = dir.path().join("missing").join("nofont.ttf");

    let font = manager.get_font(&missing.to_string_lossy());
    let seen = watch(&font);
    manager.task_queue().run_pending();

    assert_eq!(
        outcomes(&seen),
        vec![LoadOutcome::Rejected(ResourceStatus::FileNotFound)]
    );
    assert_eq!(lock(&font).status().code(), Some(1));
    assert!(!lock(&font).is_initialized());
}

/// A pending completion keeps its font registered after the caller lets go
#[test]
fn test_pending_load_holds_font_open() {
    let dir = fonts_dir();
    install_font(dir.path(), "abc");
    let manager = manager(dir.path());

    let font = manager.get_font("abc");
    let seen = watch(&font);
    drop(font);

    assert_eq!(manager.font_count(), 1);
    assert_eq!(manager.task_queue().run_pending(), 1);
    assert_eq!(outcomes(&seen), vec![LoadOutcome::Resolved]);
    assert_eq!(manager.font_count(), 0);
}

/// Removing a font's queued tasks tears it down without notifying anyone
#[test]
fn test_teardown_cancels_pending_completion() {
    let dir = fonts_dir();
    install_font(dir.path(), "abc");
    let manager = manager(dir.path());

    let font = manager.get_font("abc");
    let target = lock(&font).id().target();
    let seen = watch(&font);
    drop(font);

    let tasks = manager.task_queue();
    assert_eq!(tasks.pending_for(target), 1);
    assert_eq!(tasks.remove_all_tasks_for_object(target), 1);

    assert_eq!(manager.font_count(), 0);
    assert_eq!(tasks.run_pending(), 0);
    assert!(outcomes(&seen).is_empty());
}

#[test]
fn test_remote_font_download() {
    let dir = fonts_dir();
    let loader = ManualLoader::new();
    let manager = manager(dir.path()).with_loader(loader.clone());

    let font = manager.get_font("https://fonts.example.com/mono.ttf");
    let seen = watch(&font);
    assert_eq!(loader.pending(), 1);
    assert!(manager.task_queue().is_empty());
    assert_eq!(lock(&font).status(), ResourceStatus::Pending);

    loader.complete(TEST_FONT);
    assert_eq!(manager.task_queue().run_pending(), 1);

    assert_eq!(outcomes(&seen), vec![LoadOutcome::Resolved]);
    assert_eq!(lock(&font).status(), ResourceStatus::Ok);
    assert!(lock(&font).is_initialized());
}

#[test]
fn test_remote_font_decode_failure() {
    let dir = fonts_dir();
    let loader = ManualLoader::new();
    let manager = manager(dir.path()).with_loader(loader.clone());

    let font = manager.get_font("https://fonts.example.com/broken.ttf");
    let seen = watch(&font);
    loader.complete(b"not a font");
    manager.task_queue().run_pending();

    assert_eq!(
        outcomes(&seen),
        vec![LoadOutcome::Rejected(ResourceStatus::DecodeFailure)]
    );
    assert!(!lock(&font).is_initialized());
}

#[test]
fn test_remote_font_network_failure() {
    let dir = fonts_dir();
    let loader = ManualLoader::new();
    let manager = manager(dir.path()).with_loader(loader.clone());

    let font = manager.get_font("https://fonts.example.com/gone.ttf");
    let seen = watch(&font);
    loader.fail();
    manager.task_queue().run_pending();

    assert_eq!(
        outcomes(&seen),
        vec![LoadOutcome::Rejected(ResourceStatus::NetworkError)]
    );
    assert_eq!(lock(&font).status().code(), Some(3));
}

#[test]
fn test_offline_loader_rejects_remote_fonts() {
    let dir = fonts_dir();
    let manager = manager(dir.path());

    let font = manager.get_font("http://fonts.example.com/mono.ttf");
    let seen = watch(&font);
    manager.task_queue().run_pending();

    assert_eq!(
        outcomes(&seen),
        vec![LoadOutcome::Rejected(ResourceStatus::NetworkError)]
    );
}

/// Dropping a font mid-download cancels the request and ignores its result
#[test]
fn test_drop_cancels_download() {
    let dir = fonts_dir();
    let loader = ManualLoader::new();
    let manager = manager(dir.path()).with_loader(loader.clone());

    let font = manager.get_font("https://fonts.example.com/mono.ttf");
    assert_eq!(manager.font_count(), 1);
    drop(font);

    assert_eq!(loader.cancelled(), 1);
    assert_eq!(manager.font_count(), 0);

    loader.complete(TEST_FONT);
    assert!(manager.task_queue().is_empty());
}

#[test]
fn test_on_ready_after_settlement_is_queued() {
    let dir = fonts_dir();
    install_font(dir.path(), "abc");
    let manager = manager(dir.path());

    let font = manager.get_font("abc");
    manager.task_queue().run_pending();

    let seen = watch(&font);
    assert!(outcomes(&seen).is_empty());
    assert_eq!(manager.task_queue().run_pending(), 1);
    assert_eq!(outcomes(&seen), vec![LoadOutcome::Resolved]);
}

#[test]
fn test_empty_url_uses_default_font() {
    let dir = fonts_dir();
    let path = install_font(dir.path(), "default");
    let config = FontConfig::default()
        .with_fonts_dir(dir.path())
        .with_default_font(path.clone())
        .with_system_fallback(false);
    let manager = FontManager::new(config, TaskQueue::new());

    let font = manager.get_font("");
    assert_eq!(lock(&font).url(), path);
    assert!(lock(&font).is_initialized());
    assert!(Arc::ptr_eq(&font, &manager.get_font(&path)));
}

/// A replaced font going away does not unregister its replacement
#[test]
fn test_removed_font_does_not_evict_replacement() {
    let dir = fonts_dir();
    let path = install_font(dir.path(), "abc");
    let manager = manager(dir.path());

    let old = manager.get_font(&path);
    manager.task_queue().run_pending();
    assert!(manager.remove_font(&path));
    assert!(!manager.remove_font(&path));

    let new = manager.get_font(&path);
    assert!(!Arc::ptr_eq(&old, &new));
    drop(old);

    assert_eq!(manager.font_count(), 1);
    assert!(Arc::ptr_eq(&new, &manager.get_font(&path)));
}

#[test]
fn test_clear_all_fonts_releases_textures() {
    let dir = fonts_dir();
    install_font(dir.path(), "abc");
    let manager = manager(dir.path());
    let mut ctx = RecordingContext::new();

    let font = manager.get_font("abc");
    manager.task_queue().run_pending();
    lock(&font).fetch_glyph('x' as u32, &mut ctx).unwrap();
    lock(&font).fetch_glyph('y' as u32, &mut ctx).unwrap();
    assert_eq!(lock(manager.glyph_cache()).len(), 2);

    manager.clear_all_fonts();

    assert_eq!(ctx.released(), 2);
    assert!(lock(manager.glyph_cache()).is_empty());
}

#[test]
fn test_fonts_share_the_manager_cache() {
    let dir = fonts_dir();
    install_font(dir.path(), "one");
    install_font(dir.path(), "two");
    let manager = manager(dir.path());
    let mut ctx = RecordingContext::new();

    let one = manager.get_font("one");
    let two = manager.get_font("two");
    assert!(!Arc::ptr_eq(&one, &two));
    assert_eq!(manager.font_count(), 2);

    lock(&one).fetch_glyph('a' as u32, &mut ctx).unwrap();
    lock(&two).fetch_glyph('a' as u32, &mut ctx).unwrap();
    assert_eq!(lock(manager.glyph_cache()).len(), 2);
}
