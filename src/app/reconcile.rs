use crate::api::{Task, TaskSnapshot, TaskStatus};

use super::state::ClientState;

/// What a poll changed, so the caller re-renders only what it must.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOutcome {
    /// The selected task vanished and the selection was dropped.
    pub selection_cleared: bool,
    /// The selected task is still present but its contents differ.
    pub selected_changed: bool,
}

/// Number pending tasks 1, 2, 3... in list order. Everything else gets `None`.
pub fn annotate_queue_positions(tasks: &mut [Task]) {
    let mut rank = 0;
    for task in tasks.iter_mut() {
        task.queue_position = if task.status == TaskStatus::Pending {
            rank += 1;
            Some(rank)
        } else {
            None
        };
    }
}

/// Replace the cache with a fresh snapshot. Order is kept exactly as the
/// server sent it; tab and page are never touched.
pub fn apply_snapshot(state: &mut ClientState, snapshot: TaskSnapshot) -> ReconcileOutcome {
    let TaskSnapshot { mut tasks, queue } = snapshot;
    annotate_queue_positions(&mut tasks);

    let previous = state.selected_task().cloned();
    state.tasks = tasks;
    if queue.is_some() {
        state.queue = queue;
    }

    let mut outcome = ReconcileOutcome::default();
    if let Some(id) = state.selection.current_task {
        match state.task(id) {
            None => {
                state.selection.current_task = None;
                outcome.selection_cleared = true;
            }
            Some(after) => outcome.selected_changed = previous.as_ref() != Some(after),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CurrentTask, QueueStatus};

    fn task(id: i64, status: TaskStatus) -> Task {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("task {id}"),
            "status": status.as_str(),
            "progress": 0
        }))
        .unwrap()
    }

    fn snapshot(tasks: Vec<Task>) -> TaskSnapshot {
        TaskSnapshot {
            tasks,
            queue: Some(QueueStatus::default()),
        }
    }

    #[test]
    fn two_pending_tasks_get_positions_one_and_two() {
        let mut state = ClientState::default();
        apply_snapshot(
            &mut state,
            snapshot(vec![task(1, TaskStatus::Pending), task(2, TaskStatus::Pending)]),
        );
        assert_eq!(state.tasks[0].queue_position, Some(1));
        assert_eq!(state.tasks[1].queue_position, Some(2));
    }

    #[test]
    fn positions_rank_only_pending_tasks() {
        let mut tasks = vec![
            task(9, TaskStatus::Completed),
            task(8, TaskStatus::Pending),
            task(7, TaskStatus::Transcribing),
            task(6, TaskStatus::Pending),
            task(5, TaskStatus::Failed),
        ];
        annotate_queue_positions(&mut tasks);
        let positions: Vec<_> = tasks.iter().map(|t| t.queue_position).collect();
        assert_eq!(positions, vec![None, Some(1), None, Some(2), None]);
    }

    #[test]
    fn cache_equals_server_list_in_order() {
        let mut state = ClientState::default();
        state.tasks = vec![task(100, TaskStatus::Completed)];
        let server = vec![
            task(3, TaskStatus::Summarizing),
            task(1, TaskStatus::Pending),
            task(2, TaskStatus::Completed),
        ];
        apply_snapshot(&mut state, snapshot(server));
        let ids: Vec<_> = state.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn stale_positions_do_not_survive_a_poll() {
        let mut state = ClientState::default();
        apply_snapshot(&mut state, snapshot(vec![task(1, TaskStatus::Pending)]));
        assert_eq!(state.tasks[0].queue_position, Some(1));
        apply_snapshot(&mut state, snapshot(vec![task(1, TaskStatus::Downloading)]));
        assert_eq!(state.tasks[0].queue_position, None);
    }

    #[test]
    fn applying_the_same_snapshot_twice_is_idempotent() {
        let server = vec![task(2, TaskStatus::Pending), task(1, TaskStatus::Completed)];
        let mut state = ClientState::default();
        state.selection.current_task = Some(1);
        apply_snapshot(&mut state, snapshot(server.clone()));
        let first = (state.tasks.clone(), state.selection.clone());
        let outcome = apply_snapshot(&mut state, snapshot(server));
        assert_eq!((state.tasks.clone(), state.selection.clone()), first);
        assert!(!outcome.selected_changed);
        assert!(!outcome.selection_cleared);
    }

    #[test]
    fn vanished_selection_is_cleared_but_tab_and_page_stay() {
        let mut state = ClientState::default();
        state.tasks = vec![task(1, TaskStatus::Completed)];
        state.selection.current_task = Some(1);
        state.selection.tab = crate::app::ContentTab::Original;
        state.selection.mobile_page = crate::app::MobilePage::Summary;

        let outcome = apply_snapshot(&mut state, snapshot(vec![task(2, TaskStatus::Pending)]));
        assert!(outcome.selection_cleared);
        assert_eq!(state.selection.current_task, None);
        assert_eq!(state.selection.tab, crate::app::ContentTab::Original);
        assert_eq!(state.selection.mobile_page, crate::app::MobilePage::Summary);
    }

    #[test]
    fn progress_change_on_selected_task_is_reported() {
        let mut state = ClientState::default();
        let mut running = task(1, TaskStatus::Transcribing);
        state.tasks = vec![running.clone()];
        state.selection.current_task = Some(1);
        running.progress = Some(60);
        let outcome = apply_snapshot(&mut state, snapshot(vec![running]));
        assert!(outcome.selected_changed);
    }

    #[test]
    fn missing_queue_snapshot_keeps_previous_one() {
        let mut state = ClientState::default();
        state.queue = Some(QueueStatus {
            queue_size: 3,
            is_processing: true,
            current_task: Some(CurrentTask {
                task_id: 4,
                kind: None,
            }),
        });
        apply_snapshot(
            &mut state,
            TaskSnapshot {
                tasks: vec![],
                queue: None,
            },
        );
        assert_eq!(state.queue.as_ref().map(|q| q.queue_size), Some(3));
    }
}
