use crate::core::goal::{Goal, SubGoal, WorkSession, new_id};
use crate::core::profile::{UserProfile, UserSettings};
use crate::storage::{Storage, StoragePatch};

/// The canonical in-memory application state and its sole mutator.
///
/// Owned by the composition root and handed to whatever presentation layer
/// sits on top; nothing else may touch goals, profile, or settings. Every
/// mutation commits immediately with a synchronous write-through save — no
/// batching, no queue. Each operation affects exactly one goal (or the
/// profile/settings); there are no cross-goal transactions.
pub struct AppStore {
    profile: Option<UserProfile>,
    goals: Vec<Goal>,
    settings: UserSettings,
    storage: Storage,
}

impl AppStore {
    /// Seed the store from persisted state. Raw records are migrated by the
    /// gateway before they get here.
    pub fn load(storage: Storage) -> Self {
        let data = storage.load();
        Self {
            profile: data.profile,
            goals: data.goals,
            settings: data.settings,
            storage,
        }
    }

    fn persist(&self) {
        self.storage.save(StoragePatch {
            profile: Some(self.profile.clone()),
            goals: Some(self.goals.clone()),
            settings: Some(self.settings.clone()),
        });
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn active_goals(&self) -> Vec<&Goal> {
        self.goals.iter().filter(|g| !g.is_completed()).collect()
    }

    pub fn completed_goals(&self) -> Vec<&Goal> {
        self.goals.iter().filter(|g| g.is_completed()).collect()
    }

    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
        self.persist();
    }

    /// Insert a goal under a freshly generated id; returns the id.
    pub fn add_goal(&mut self, mut goal: Goal) -> String {
        goal.id = new_id();
        let id = goal.id.clone();
        self.goals.push(goal);
        self.persist();
        id
    }

    /// Whole-record replace of the goal with the same id.
    pub fn update_goal(&mut self, updated: Goal) {
        if let Some(goal) = self.goals.iter_mut().find(|g| g.id == updated.id) {
            *goal = updated;
            self.persist();
        }
    }

    /// Stamp the goal complete as of now, regardless of sub-goal state.
    pub fn complete_goal(&mut self, id: &str) {
        self.complete_goal_at(id, crate::core::now());
    }

    pub fn complete_goal_at(&mut self, id: &str, now: chrono::NaiveDateTime) {
        if let Some(goal) = self.goal_mut(id) {
            goal.completed_at = Some(now);
            self.persist();
        }
    }

    /// Clear a manual completion, returning the goal to pending.
    pub fn restore_goal(&mut self, id: &str) {
        if let Some(goal) = self.goal_mut(id) {
            goal.completed_at = None;
            self.persist();
        }
    }

    pub fn delete_goal(&mut self, id: &str) {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        if self.goals.len() != before {
            self.persist();
        }
    }

    pub fn add_sub_goal(&mut self, goal_id: &str, title: impl Into<String>) -> Option<String> {
        let goal = self.goal_mut(goal_id)?;
        let sub = SubGoal::new(title);
        let id = sub.id.clone();
        goal.sub_goals.push(sub);
        self.persist();
        Some(id)
    }

    pub fn toggle_sub_goal(&mut self, goal_id: &str, sub_id: &str) {
        self.toggle_sub_goal_at(goal_id, sub_id, crate::core::now());
    }

    pub fn toggle_sub_goal_at(&mut self, goal_id: &str, sub_id: &str, now: chrono::NaiveDateTime) {
        if let Some(goal) = self.goal_mut(goal_id) {
            if let Some(sub) = goal.sub_goals.iter_mut().find(|s| s.id == sub_id) {
                sub.completed = !sub.completed;
                sub.completed_at = sub.completed.then_some(now);
                self.persist();
            }
        }
    }

    pub fn rename_sub_goal(&mut self, goal_id: &str, sub_id: &str, title: impl Into<String>) {
        if let Some(goal) = self.goal_mut(goal_id) {
            if let Some(sub) = goal.sub_goals.iter_mut().find(|s| s.id == sub_id) {
                sub.title = title.into();
                self.persist();
            }
        }
    }

    pub fn delete_sub_goal(&mut self, goal_id: &str, sub_id: &str) {
        if let Some(goal) = self.goal_mut(goal_id) {
            let before = goal.sub_goals.len();
            goal.sub_goals.retain(|s| s.id != sub_id);
            if goal.sub_goals.len() != before {
                self.persist();
            }
        }
    }

    pub fn add_work_session(
        &mut self,
        goal_id: &str,
        hours: f64,
        description: Option<String>,
    ) -> Option<String> {
        let goal = self.goal_mut(goal_id)?;
        let session = WorkSession::new(hours, description);
        let id = session.id.clone();
        goal.work_sessions.push(session);
        self.persist();
        Some(id)
    }

    pub fn delete_work_session(&mut self, goal_id: &str, session_id: &str) {
        if let Some(goal) = self.goal_mut(goal_id) {
            let before = goal.work_sessions.len();
            goal.work_sessions.retain(|s| s.id != session_id);
            if goal.work_sessions.len() != before {
                self.persist();
            }
        }
    }

    pub fn set_theme(&mut self, theme_id: impl Into<String>) {
        self.settings.theme_id = theme_id.into();
        self.persist();
    }

    pub fn set_background_image(&mut self, image: Option<String>) {
        self.settings.background_image = image;
        self.persist();
    }

    pub fn export_data(&self) -> String {
        self.storage.export()
    }

    /// Import a backup envelope; on success the in-memory state is reseeded
    /// from the migrated result.
    pub fn import_data(&mut self, json: &str) -> bool {
        if !self.storage.import(json) {
            return false;
        }
        let data = self.storage.load();
        self.profile = data.profile;
        self.goals = data.goals;
        self.settings = data.settings;
        true
    }

    fn goal_mut(&mut self, id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }
}
