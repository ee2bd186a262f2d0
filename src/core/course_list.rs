use crate::core::edit_form::EditForm;
use crate::core::in_flight::{ActionKey, InFlight};
use crate::core::reconcile::{self, EnrollmentSet, Snapshot};
use crate::domain::model::{Course, CourseDraft, CourseId, MessageBody, SavedCourse, ViewerRole};
use crate::domain::ports::{CourseBackend, CourseFeed, TokenProvider};
use crate::utils::error::{DeskError, Result};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ViewState {
    enrolled: EnrollmentSet,
    edit_form: EditForm,
    last_error: Option<String>,
}

/// Headless course list. Owns the enrollment set and the edit form, derives
/// the available courses from the feed, and turns user actions into backend
/// calls.
///
/// Handlers never return errors. Failures are logged, remembered as
/// [`CourseListView::last_error`], and signalled by a `false` return.
pub struct CourseListView<B: CourseBackend, T: TokenProvider, F: CourseFeed> {
    backend: B,
    tokens: T,
    feed: F,
    role: ViewerRole,
    in_flight: InFlight,
    state: Mutex<ViewState>,
}

impl<B: CourseBackend, T: TokenProvider, F: CourseFeed> CourseListView<B, T, F> {
    pub fn new(backend: B, tokens: T, feed: F, role: ViewerRole) -> Self {
        Self {
            backend,
            tokens,
            feed,
            role,
            in_flight: InFlight::new(),
            state: Mutex::new(ViewState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn role(&self) -> &ViewerRole {
        &self.role
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn enrolled(&self) -> EnrollmentSet {
        self.state().enrolled.clone()
    }

    pub fn available_courses(&self) -> Vec<Course> {
        let courses = self.feed.courses();
        let state = self.state();
        reconcile::available_courses(&courses, &state.enrolled)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let courses = self.feed.courses();
        let loading = self.feed.is_loading();
        let state = self.state();
        reconcile::build_snapshot(&courses, &state.enrolled, &self.role, loading)
    }

    /// Maps typed-in text to a known course id, so a text id `"42"` is not
    /// mistaken for the number 42. Falls back to [`CourseId::parse`] when
    /// neither the feed nor the enrollment set knows the id.
    pub fn resolve_id(&self, input: &str) -> CourseId {
        let input = input.trim();
        let courses = self.feed.courses();
        let state = self.state();
        courses
            .iter()
            .map(|c| &c.id)
            .chain(state.enrolled.iter())
            .find(|id| id.to_string() == input)
            .cloned()
            .unwrap_or_else(|| CourseId::parse(input))
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn edit_form(&self) -> EditForm {
        self.state().edit_form.clone()
    }

    pub fn toggle_edit_form(&self, course: Option<Course>) {
        self.state().edit_form.toggle(course);
    }

    pub fn close_edit_form(&self) {
        self.state().edit_form.close();
    }

    /// Initial load. Only students have an enrollment set to fetch.
    pub async fn mount(&self) -> bool {
        if !self.role.is_student() {
            tracing::debug!("Viewer role '{}' has no enrollments to fetch", self.role);
            return true;
        }
        self.fetch_enrolled().await
    }

    /// Replaces the enrollment set with the backend's. Leaves it untouched on failure.
    pub async fn fetch_enrolled(&self) -> bool {
        match self.try_fetch_enrolled().await {
            Ok(count) => {
                tracing::debug!("Fetched {} enrolled course ids", count);
                self.succeeded()
            }
            Err(e) => self.failed("fetching user courses", e),
        }
    }

    async fn try_fetch_enrolled(&self) -> Result<usize> {
        let token = self.tokens.bearer_token()?;
        let response = self.backend.list_enrolled(&token).await?;
        let enrolled: EnrollmentSet = response.courses.into_iter().collect();
        let count = enrolled.len();
        self.state().enrolled = enrolled;
        Ok(count)
    }

    /// Creates the course when the draft has no id, updates it otherwise.
    /// On success the feed is refetched and the edit form closes.
    pub async fn save_course(&self, draft: CourseDraft) -> bool {
        let verb = if draft.id.is_some() { "updating" } else { "adding" };
        match self.try_save_course(&draft).await {
            Ok(saved) => {
                match saved {
                    SavedCourse::Stored(course) => {
                        tracing::info!("Saved course {} ({})", course.id, course.name)
                    }
                    SavedCourse::Acknowledged(body) => tracing::info!("{}", body.message),
                }
                self.feed.fetch_courses().await;
                self.state().edit_form.close();
                self.succeeded()
            }
            Err(e) => self.failed(&format!("{} course", verb), e),
        }
    }

    async fn try_save_course(&self, draft: &CourseDraft) -> Result<SavedCourse> {
        let key = match &draft.id {
            Some(id) => ActionKey::Course(id.clone()),
            None => ActionKey::NewCourse,
        };
        let _ticket = self.in_flight.acquire(key)?;
        let token = self.tokens.bearer_token()?;

        match &draft.id {
            Some(id) => self.backend.update_course(&token, id, draft).await,
            None => self.backend.create_course(&token, draft).await,
        }
    }

    pub async fn remove_course(&self, id: &CourseId) -> bool {
        match self.try_remove_course(id).await {
            Ok(()) => {
                tracing::info!("Removed course {}", id);
                self.feed.fetch_courses().await;
                self.succeeded()
            }
            Err(e) => self.failed("removing course", e),
        }
    }

    async fn try_remove_course(&self, id: &CourseId) -> Result<()> {
        let _ticket = self.in_flight.acquire(ActionKey::Course(id.clone()))?;
        let token = self.tokens.bearer_token()?;
        self.backend.remove_course(&token, id).await
    }

    /// Adds the course to the viewer's enrollments, then refetches the enrollment set.
    /// Reports success only when the refetch succeeds too.
    pub async fn enroll(&self, id: &CourseId) -> bool {
        self.change_enrollment(id, true).await
    }

    pub async fn unenroll(&self, id: &CourseId) -> bool {
        self.change_enrollment(id, false).await
    }

    async fn change_enrollment(&self, id: &CourseId, enroll: bool) -> bool {
        match self.try_change_enrollment(id, enroll).await {
            Ok(body) => {
                tracing::info!("{}", body.message);
                self.fetch_enrolled().await
            }
            Err(e) if enroll => self.failed("adding course to user", e),
            Err(e) => self.failed("removing course from user", e),
        }
    }

    async fn try_change_enrollment(&self, id: &CourseId, enroll: bool) -> Result<MessageBody> {
        let _ticket = self.in_flight.acquire(ActionKey::Course(id.clone()))?;
        let token = self.tokens.bearer_token()?;
        if enroll {
            self.backend.enroll(&token, id).await
        } else {
            self.backend.unenroll(&token, id).await
        }
    }

    fn succeeded(&self) -> bool {
        self.state().last_error = None;
        true
    }

    fn failed(&self, action: &str, e: DeskError) -> bool {
        tracing::error!(
            "Error {}: {} (Category: {:?}, Severity: {:?})",
            action,
            e,
            e.category(),
            e.severity()
        );
        self.state().last_error = Some(e.user_friendly_message());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnrolledCourses, Level};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        ListEnrolled,
        Create,
        Update(CourseId),
        Remove(CourseId),
        Enroll(CourseId),
        Unenroll(CourseId),
    }

    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<(Call, String)>>,
        enrolled: Mutex<Vec<CourseId>>,
        fail: Mutex<bool>,
        fail_listing: Mutex<bool>,
        acknowledge_only: Mutex<bool>,
    }

    impl MockBackend {
        fn with_enrolled(ids: &[i64]) -> Self {
            let backend = Self::default();
            *backend.enrolled.lock().unwrap() = ids.iter().map(|&i| CourseId::from(i)).collect();
            backend
        }

        fn failing(self) -> Self {
            *self.fail.lock().unwrap() = true;
            self
        }

        fn record(&self, call: Call, token: &str) -> Result<()> {
            self.calls.lock().unwrap().push((call, token.to_string()));
            if *self.fail.lock().unwrap() {
                return Err(DeskError::Status {
                    status: 500,
                    message: Some("boom".to_string()),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }
    }

    fn saved(draft: &CourseDraft, id: CourseId) -> Course {
        Course {
            id,
            name: draft.name.clone(),
            instructor: draft.instructor.clone(),
            start_date: draft.start_date.clone(),
            duration: draft.duration.clone(),
            level: draft.level.clone(),
        }
    }

    #[async_trait]
    impl CourseBackend for Arc<MockBackend> {
        async fn list_courses(&self, _token: &str) -> Result<Vec<Course>> {
            Ok(vec![])
        }

        async fn list_enrolled(&self, token: &str) -> Result<EnrolledCourses> {
            self.record(Call::ListEnrolled, token)?;
            if *self.fail_listing.lock().unwrap() {
                return Err(DeskError::Status {
                    status: 500,
                    message: None,
                });
            }
            Ok(EnrolledCourses {
                courses: self.enrolled.lock().unwrap().clone(),
            })
        }

        async fn create_course(&self, token: &str, draft: &CourseDraft) -> Result<SavedCourse> {
            self.record(Call::Create, token)?;
            Ok(SavedCourse::Stored(saved(draft, CourseId::from(100))))
        }

        async fn update_course(
            &self,
            token: &str,
            id: &CourseId,
            draft: &CourseDraft,
        ) -> Result<SavedCourse> {
            self.record(Call::Update(id.clone()), token)?;
            if *self.acknowledge_only.lock().unwrap() {
                return Ok(SavedCourse::Acknowledged(MessageBody {
                    message: "Course updated successfully".to_string(),
                }));
            }
            Ok(SavedCourse::Stored(saved(draft, id.clone())))
        }

        async fn remove_course(&self, token: &str, id: &CourseId) -> Result<()> {
            self.record(Call::Remove(id.clone()), token)
        }

        async fn enroll(&self, token: &str, id: &CourseId) -> Result<MessageBody> {
            self.record(Call::Enroll(id.clone()), token)?;
            self.enrolled.lock().unwrap().push(id.clone());
            Ok(MessageBody {
                message: "Course added".to_string(),
            })
        }

        async fn unenroll(&self, token: &str, id: &CourseId) -> Result<MessageBody> {
            self.record(Call::Unenroll(id.clone()), token)?;
            self.enrolled.lock().unwrap().retain(|c| c != id);
            Ok(MessageBody {
                message: "Course removed".to_string(),
            })
        }
    }

    struct FixedToken(Option<&'static str>);

    impl TokenProvider for FixedToken {
        fn bearer_token(&self) -> Result<String> {
            self.0.map(str::to_string).ok_or_else(|| DeskError::MissingCredential {
                reason: "not signed in".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct CountingFeed {
        courses: Vec<Course>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl CourseFeed for CountingFeed {
        fn courses(&self) -> Vec<Course> {
            self.courses.clone()
        }

        fn is_loading(&self) -> bool {
            false
        }

        async fn fetch_courses(&self) {
            self.fetches.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn course(id: i64) -> Course {
        Course {
            id: CourseId::from(id),
            name: format!("Course {}", id),
            instructor: "Staff".to_string(),
            start_date: "2024-03-01".to_string(),
            duration: "8".to_string(),
            level: Level::Beginner,
        }
    }

    fn view(
        backend: &Arc<MockBackend>,
        role: &str,
        courses: Vec<Course>,
    ) -> CourseListView<Arc<MockBackend>, FixedToken, CountingFeed> {
        CourseListView::new(
            Arc::clone(backend),
            FixedToken(Some("tok-123")),
            CountingFeed {
                courses,
                ..Default::default()
            },
            ViewerRole::parse(role),
        )
    }

    #[tokio::test]
    async fn test_mount_fetches_enrollments_for_students_only() {
        let backend = Arc::new(MockBackend::with_enrolled(&[1]));
        let student = view(&backend, "student", vec![course(1), course(2)]);
        assert!(student.mount().await);
        assert_eq!(backend.calls(), vec![Call::ListEnrolled]);
        assert_eq!(
            student.available_courses().iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
            vec![CourseId::from(2)]
        );

        let admin_backend = Arc::new(MockBackend::with_enrolled(&[1]));
        let admin = view(&admin_backend, "admin", vec![course(1)]);
        assert!(admin.mount().await);
        assert!(admin_backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_enrollment_fetch_keeps_previous_set() {
        let backend = Arc::new(MockBackend::with_enrolled(&[1]));
        let view = view(&backend, "student", vec![course(1), course(2)]);
        assert!(view.fetch_enrolled().await);

        *backend.fail.lock().unwrap() = true;
        *backend.enrolled.lock().unwrap() = vec![];
        assert!(!view.fetch_enrolled().await);

        assert!(view.enrolled().contains(&CourseId::from(1)));
        assert_eq!(view.last_error().as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_save_dispatches_on_identifier() {
        let backend = Arc::new(MockBackend::default());
        let view = view(&backend, "admin", vec![course(1)]);

        view.toggle_edit_form(None);
        let draft = CourseDraft {
            name: "Fresh".to_string(),
            ..Default::default()
        };
        assert!(view.save_course(draft).await);

        view.toggle_edit_form(Some(course(1)));
        let draft = view.edit_form().draft().unwrap();
        assert!(view.save_course(draft).await);

        assert_eq!(
            backend.calls(),
            vec![Call::Create, Call::Update(CourseId::from(1))]
        );
        assert_eq!(view.feed().fetches.load(Ordering::SeqCst), 2);
        assert!(!view.edit_form().is_open());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_form_open() {
        let backend = Arc::new(MockBackend::default().failing());
        let view = view(&backend, "admin", vec![course(1)]);

        view.toggle_edit_form(Some(course(1)));
        assert!(!view.save_course(course(1).to_draft()).await);

        assert_eq!(view.edit_form().selection(), Some(&course(1)));
        assert_eq!(view.feed().fetches.load(Ordering::SeqCst), 0);
        assert!(view.last_error().is_some());
    }

    #[tokio::test]
    async fn test_acknowledged_update_counts_as_saved() {
        let backend = Arc::new(MockBackend::default());
        *backend.acknowledge_only.lock().unwrap() = true;
        let view = view(&backend, "admin", vec![course(1)]);

        view.toggle_edit_form(Some(course(1)));
        let draft = view.edit_form().draft().unwrap();
        assert!(view.save_course(draft).await);

        assert!(!view.edit_form().is_open());
        assert_eq!(view.feed().fetches.load(Ordering::SeqCst), 1);
        assert!(view.last_error().is_none());
    }

    #[tokio::test]
    async fn test_close_without_saving_issues_nothing() {
        let backend = Arc::new(MockBackend::default());
        let view = view(&backend, "admin", vec![course(1)]);

        view.toggle_edit_form(Some(course(1)));
        view.close_edit_form();

        assert_eq!(view.edit_form(), EditForm::Closed);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_refetches_once() {
        let backend = Arc::new(MockBackend::default());
        let view = view(&backend, "admin", vec![course(1), course(2)]);

        assert!(view.remove_course(&CourseId::from(2)).await);

        assert_eq!(backend.calls(), vec![Call::Remove(CourseId::from(2))]);
        assert_eq!(view.feed().fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enroll_and_unenroll_refetch_enrollments_not_courses() {
        let backend = Arc::new(MockBackend::default());
        let view = view(&backend, "student", vec![course(1), course(2)]);

        assert!(view.enroll(&CourseId::from(2)).await);
        assert!(view.enrolled().contains(&CourseId::from(2)));

        assert!(view.unenroll(&CourseId::from(2)).await);
        assert!(view.enrolled().is_empty());

        assert_eq!(
            backend.calls(),
            vec![
                Call::Enroll(CourseId::from(2)),
                Call::ListEnrolled,
                Call::Unenroll(CourseId::from(2)),
                Call::ListEnrolled,
            ]
        );
        assert_eq!(view.feed().fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enroll_fails_when_enrollment_refetch_fails() {
        let backend = Arc::new(MockBackend::default());
        *backend.fail_listing.lock().unwrap() = true;
        let view = view(&backend, "student", vec![course(1), course(2)]);

        assert!(!view.enroll(&CourseId::from(2)).await);

        assert_eq!(
            backend.calls(),
            vec![Call::Enroll(CourseId::from(2)), Call::ListEnrolled]
        );
        assert!(view.enrolled().is_empty());
        assert!(view.last_error().is_some());
    }

    #[tokio::test]
    async fn test_resolve_id_prefers_known_ids() {
        let backend = Arc::new(MockBackend::with_enrolled(&[9]));
        let mut text_course = course(0);
        text_course.id = CourseId::from("42");
        let view = view(&backend, "student", vec![text_course, course(7)]);
        assert!(view.mount().await);

        assert_eq!(view.resolve_id("42"), CourseId::from("42"));
        assert_eq!(view.resolve_id(" 7 "), CourseId::from(7));
        assert_eq!(view.resolve_id("9"), CourseId::from(9));
        assert_eq!(view.resolve_id("13"), CourseId::from(13));
        assert_eq!(view.resolve_id("x1"), CourseId::from("x1"));
    }

    #[tokio::test]
    async fn test_missing_token_issues_no_request() {
        let backend = Arc::new(MockBackend::default());
        let view = CourseListView::new(
            Arc::clone(&backend),
            FixedToken(None),
            CountingFeed::default(),
            ViewerRole::Student,
        );

        assert!(!view.enroll(&CourseId::from(1)).await);
        assert!(backend.calls().is_empty());
        assert_eq!(view.last_error().as_deref(), Some("You are not signed in"));
    }

    #[tokio::test]
    async fn test_every_call_carries_the_injected_token() {
        let backend = Arc::new(MockBackend::with_enrolled(&[]));
        let view = view(&backend, "student", vec![course(1)]);
        view.mount().await;
        view.enroll(&CourseId::from(1)).await;

        let calls = backend.calls.lock().unwrap();
        assert!(!calls.is_empty());
        assert!(calls.iter().all(|(_, token)| token == "tok-123"));
    }
}
