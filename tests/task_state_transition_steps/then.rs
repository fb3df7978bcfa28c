//! Then steps for task state transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use eyre::WrapErr;
use polaris::task::{
    domain::{Task, TaskState, TransitionError, TransitionEvent},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

fn stored_task(world: &TaskTransitionWorld) -> Result<Task, eyre::Report> {
    let task_id = world.current_task()?.id();
    run_async(world.service.find_by_id(task_id))
        .wrap_err("look up scenario task")?
        .ok_or_else(|| eyre::eyre!("task {task_id} missing from repository"))
}

fn transition_error(world: &TaskTransitionWorld) -> Result<&TaskLifecycleError, eyre::Report> {
    match world.last_transition_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(outcome)) => Err(eyre::eyre!(
            "expected the transition to fail, task is now {}",
            outcome.task().state()
        )),
        None => Err(eyre::eyre!("missing transition result")),
    }
}

fn next_session_event(world: &mut TaskTransitionWorld) -> Result<TransitionEvent, eyre::Report> {
    world
        .session
        .as_mut()
        .ok_or_else(|| eyre::eyre!("no live session connected"))?
        .try_recv()
        .ok_or_else(|| eyre::eyre!("session received no event"))
}

fn parse_state(raw: &str) -> Result<TaskState, eyre::Report> {
    TaskState::try_from(raw).map_err(|err| eyre::eyre!("invalid state in scenario: {err}"))
}

#[then(r#"the task state is "{state}""#)]
fn task_state_is(world: &TaskTransitionWorld, state: String) -> Result<(), eyre::Report> {
    let expected_state = parse_state(&state)?;
    let task = stored_task(world)?;
    eyre::ensure!(
        task.state() == expected_state,
        "expected state {expected_state}, found {}",
        task.state()
    );
    Ok(())
}

#[then("the transition fails with an illegal transition error")]
fn fails_with_illegal_transition(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let err = transition_error(world)?;
    eyre::ensure!(
        matches!(
            err,
            TaskLifecycleError::Transition(TransitionError::IllegalTransition { .. })
        ),
        "expected IllegalTransition, got {err:?}"
    );
    Ok(())
}

#[then("the transition fails with a terminal state error")]
fn fails_with_terminal_state(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let err = transition_error(world)?;
    eyre::ensure!(
        matches!(
            err,
            TaskLifecycleError::Transition(TransitionError::TerminalStateViolation { .. })
        ),
        "expected TerminalStateViolation, got {err:?}"
    );
    Ok(())
}

#[then("the transition fails with a no-op transition error")]
fn fails_with_no_op(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let err = transition_error(world)?;
    eyre::ensure!(
        matches!(
            err,
            TaskLifecycleError::Transition(TransitionError::NoOpTransition { .. })
        ),
        "expected NoOpTransition, got {err:?}"
    );
    Ok(())
}

#[then("the transition fails with an invalid state error")]
fn fails_with_invalid_state(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let err = transition_error(world)?;
    eyre::ensure!(
        matches!(err, TaskLifecycleError::InvalidState(_)),
        "expected InvalidState, got {err:?}"
    );
    Ok(())
}

#[then("the transition fails with an invalid cognitive load error")]
fn fails_with_invalid_load(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let err = transition_error(world)?;
    eyre::ensure!(
        matches!(
            err,
            TaskLifecycleError::Transition(TransitionError::InvalidCognitiveLoad(_))
        ),
        "expected InvalidCognitiveLoad, got {err:?}"
    );
    Ok(())
}

#[then("the task cognitive load is {load}")]
fn task_cognitive_load_is(world: &TaskTransitionWorld, load: u8) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(
        task.cognitive_load().value() == load,
        "expected cognitive load {load}, found {}",
        task.cognitive_load()
    );
    Ok(())
}

#[then(r#"the session receives a state change from "{from}" to "{to}""#)]
fn session_receives_state_change(
    world: &mut TaskTransitionWorld,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    let expected_from = parse_state(&from)?;
    let expected_to = parse_state(&to)?;
    let event = next_session_event(world)?;
    eyre::ensure!(!event.is_celebration(), "expected a state change event");
    eyre::ensure!(
        event.from == expected_from && event.to == expected_to,
        "expected {expected_from} -> {expected_to}, got {} -> {}",
        event.from,
        event.to
    );
    Ok(())
}

#[then("the session receives a celebration")]
fn session_receives_celebration(world: &mut TaskTransitionWorld) -> Result<(), eyre::Report> {
    let event = next_session_event(world)?;
    eyre::ensure!(event.is_celebration(), "expected a celebration, got {event:?}");
    Ok(())
}

#[then("the activity log records {count} events for the task")]
fn activity_log_records(world: &TaskTransitionWorld, count: usize) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let recorded = world.activity.entries_for_task(task_id).len();
    eyre::ensure!(
        recorded == count,
        "expected {count} recorded events, found {recorded}"
    );
    Ok(())
}

#[then("the task has an archive timestamp")]
fn task_has_archive_timestamp(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(
        task.archived_at().is_some(),
        "archived task is missing its archive timestamp"
    );
    Ok(())
}
