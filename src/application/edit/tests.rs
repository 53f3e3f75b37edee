use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use contentdesk_api_types::{ContentFile, ContentPatch, Hero};
use time::macros::datetime;

use super::*;

fn hero(id: i64, title: &str, content: &str) -> Hero {
    Hero {
        id,
        title: Some(title.into()),
        content: Some(content.into()),
        is_draft: false,
        is_active: true,
        created_at: datetime!(2025-02-10 12:00 UTC),
        updated_at: datetime!(2025-02-10 12:00 UTC),
        author_id: "admin".into(),
        files: vec![ContentFile {
            id: 3,
            name: "hero.mp4".into(),
            file_type: "video/mp4".into(),
            url: "https://cdn.example/hero.mp4".into(),
            size: 2048,
            created_at: None,
            updated_at: None,
            target_type: Some("HERO".into()),
            target_id: Some(id),
        }],
        order: Some(0),
    }
}

#[derive(Default)]
struct FakeHeroes {
    fetches: AtomicUsize,
    patches: Mutex<Vec<(i64, ContentPatch)>>,
    fail_fetch: AtomicBool,
    fail_update: AtomicBool,
}

#[async_trait]
impl PublishedApi<Hero> for FakeHeroes {
    async fn fetch(&self, id: i64) -> Result<Hero, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 404,
                message: "히어로 조회 실패".into(),
            });
        }
        Ok(hero(id, "Spring event", "<p>Join us</p>"))
    }

    async fn update(&self, id: i64, patch: &ContentPatch) -> Result<Hero, ApiError> {
        self.patches.lock().unwrap().push((id, patch.clone()));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(ApiError::Rejected {
                code: "ERROR".into(),
                message: "히어로 수정 실패".into(),
            });
        }
        Ok(hero(
            id,
            patch.title.as_deref().unwrap_or_default(),
            patch.content.as_deref().unwrap_or_default(),
        ))
    }
}

struct AnsweringShell(bool, Mutex<Vec<String>>);

impl Shell for AnsweringShell {
    fn notify(&self, _message: &str) {}

    fn confirm(&self, question: &str) -> bool {
        self.1.lock().unwrap().push(question.to_string());
        self.0
    }

    fn navigate(&self, _route: &str) {}
}

fn editor(api: &Arc<FakeHeroes>) -> ContentEditor<Hero> {
    ContentEditor::new(
        Arc::clone(api) as Arc<dyn PublishedApi<Hero>>,
        entity_projection::<Hero>(),
    )
}

#[tokio::test]
async fn load_projects_fields_and_fetches_each_id_once() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api);
    assert!(editor.is_loading());

    let loaded = editor.load(Some("7")).await.expect("hero");
    assert_eq!(loaded.id, 7);
    assert_eq!(editor.title(), "Spring event");
    assert_eq!(editor.content(), "<p>Join us</p>");
    assert_eq!(editor.image_url(), Some("https://cdn.example/hero.mp4"));
    assert!(!editor.is_loading());
    assert!(!editor.is_dirty());

    editor.load(Some("7")).await.expect("cached");
    assert_eq!(api.fetches.load(Ordering::SeqCst), 1);

    editor.load(Some("8")).await.expect("other hero");
    assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(editor.id(), Some(8));
}

#[tokio::test]
async fn bad_identifiers_and_fetch_failures_leave_no_data() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api);

    assert!(editor.load(None).await.is_none());
    assert!(editor.load(Some("abc")).await.is_none());
    assert_eq!(api.fetches.load(Ordering::SeqCst), 0);

    api.fail_fetch.store(true, Ordering::SeqCst);
    assert!(editor.load(Some("3")).await.is_none());
    assert!(editor.data().is_none());
    assert!(!editor.is_loading());

    let err = ContentEditor::new(
        Arc::clone(&api) as Arc<dyn PublishedApi<Hero>>,
        entity_projection::<Hero>(),
    )
    .save()
    .await
    .expect_err("nothing loaded");
    assert!(matches!(err, ApiError::Precondition(_)));
}

#[tokio::test]
async fn dirty_tracks_title_and_content_against_the_baseline() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api);
    editor.load(Some("1")).await.expect("hero");

    editor.set_title("Summer event");
    assert!(editor.is_dirty());
    editor.set_title("Spring event");
    assert!(!editor.is_dirty());

    editor.set_content("<p>Changed</p>");
    assert!(editor.is_dirty());
    editor.clear_changes();
    assert!(!editor.is_dirty());
    assert!(api.patches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn save_sends_title_and_content_and_resets_the_baseline() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api);
    editor.load(Some("5")).await.expect("hero");
    editor.set_title("Summer event");

    let saved = editor.save().await.expect("saved");
    assert_eq!(saved.title.as_deref(), Some("Summer event"));
    assert!(!editor.is_dirty());
    assert!(!editor.is_saving());

    let patches = api.patches.lock().unwrap().clone();
    assert_eq!(
        patches,
        vec![(
            5,
            ContentPatch {
                title: Some("Summer event".into()),
                content: Some("<p>Join us</p>".into()),
                ..ContentPatch::default()
            }
        )]
    );
}

#[tokio::test]
async fn failed_save_propagates_and_keeps_changes() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api);
    editor.load(Some("5")).await.expect("hero");
    api.fail_update.store(true, Ordering::SeqCst);
    editor.set_content("<p>Edited</p>");

    let err = editor.save().await.expect_err("rejected");
    assert_eq!(err.to_string(), "히어로 수정 실패");
    assert!(editor.is_dirty());
    assert!(!editor.is_saving());
    assert_eq!(
        editor.data().and_then(|hero| hero.content.as_deref()),
        Some("<p>Join us</p>")
    );
}

#[tokio::test]
async fn patch_builder_replaces_the_default_body() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api).with_patch_builder(|title, content| ContentPatch {
        title: Some(title.to_uppercase()),
        content: Some(content.to_string()),
        file_id: Some(3),
        ..ContentPatch::default()
    });
    editor.load(Some("2")).await.expect("hero");

    editor.save().await.expect("saved");
    let (_, patch) = api.patches.lock().unwrap()[0].clone();
    assert_eq!(patch.title.as_deref(), Some("SPRING EVENT"));
    assert_eq!(patch.file_id, Some(3));
}

#[tokio::test]
async fn leaving_asks_only_when_something_changed() {
    let api = Arc::new(FakeHeroes::default());
    let mut editor = editor(&api);
    editor.load(Some("2")).await.expect("hero");
    let shell = AnsweringShell(false, Mutex::default());

    assert!(editor.confirm_leave(false, &shell));
    assert!(!editor.confirm_leave(true, &shell));

    editor.set_title("Draft title");
    assert!(!editor.confirm_leave(false, &shell));
    assert_eq!(shell.1.lock().unwrap().len(), 2);
    assert_eq!(shell.1.lock().unwrap()[0], LEAVE_CONFIRM);
}
