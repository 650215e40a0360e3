use super::goal::Goal;

/// Derived completion state of a goal. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub completed: usize,
    pub total: usize,
    /// 0..=100
    pub percentage: u32,
    pub is_complete: bool,
}

pub fn goal_progress(goal: &Goal) -> GoalProgress {
    // Manual completion overrides sub-goal state
    if goal.completed_at.is_some() {
        return GoalProgress {
            completed: goal.sub_goals.len(),
            total: goal.sub_goals.len(),
            percentage: 100,
            is_complete: true,
        };
    }

    // Goals without sub-goals are binary: pending until completed
    if goal.sub_goals.is_empty() {
        return GoalProgress {
            completed: 0,
            total: 1,
            percentage: 0,
            is_complete: false,
        };
    }

    let completed = goal.sub_goals.iter().filter(|s| s.completed).count();
    let total = goal.sub_goals.len();
    let percentage = (completed as f64 / total as f64 * 100.0).round() as u32;

    GoalProgress {
        completed,
        total,
        percentage,
        is_complete: percentage == 100,
    }
}

/// Policy signal: every sub-goal is done but the goal itself has not been
/// marked complete. Pure; whether to promote the goal is the caller's call —
/// no mutation path in this crate acts on it.
pub fn should_auto_complete(goal: &Goal) -> bool {
    goal_progress(goal).percentage == 100
        && goal.completed_at.is_none()
        && !goal.sub_goals.is_empty()
}

pub fn progress_label(progress: &GoalProgress) -> String {
    if progress.total == 1 {
        if progress.is_complete {
            "Completed".to_string()
        } else {
            "Pending".to_string()
        }
    } else {
        format!("{}/{} steps", progress.completed, progress.total)
    }
}
