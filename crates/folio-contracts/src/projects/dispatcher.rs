use thiserror::Error;

use crate::config::Settings;
use crate::console::{Console, ConsoleExt};
use crate::session::SessionState;

use super::registry::ProjectRegistry;

/// Everything a routine may touch while rendering. Owned by the host loop.
pub struct RenderContext<'a> {
    pub console: &'a mut dyn Console,
    pub session: &'a mut SessionState,
    pub settings: &'a Settings,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        session: &'a mut SessionState,
        settings: &'a Settings,
    ) -> Self {
        Self {
            console,
            session,
            settings,
        }
    }
}

/// A single-screen application with one render entry point.
///
/// Routines report their own domain failures (missing files, bad input) on
/// the console and return `Ok`. An `Err` means the routine could not run.
pub trait Routine {
    fn render(&self, ctx: &mut RenderContext<'_>) -> anyhow::Result<()>;
}

impl<R: Routine + ?Sized> Routine for Box<R> {
    fn render(&self, ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        (**self).render(ctx)
    }
}

/// Routine backed by a closure. See [`from_fn`].
pub struct FnRoutine<F>(F);

/// Wraps a closure with the render signature as a [`Routine`].
pub fn from_fn<F>(render: F) -> FnRoutine<F>
where
    F: Fn(&mut RenderContext<'_>) -> anyhow::Result<()>,
{
    FnRoutine(render)
}

impl<F> Routine for FnRoutine<F>
where
    F: Fn(&mut RenderContext<'_>) -> anyhow::Result<()>,
{
    fn render(&self, ctx: &mut RenderContext<'_>) -> anyhow::Result<()> {
        (self.0)(ctx)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Project not found: {name}")]
    ProjectNotFound { name: String },

    #[error("Project '{name}' could not be loaded: {reason}")]
    ProjectResolution { name: String, reason: String },
}

impl DispatchError {
    pub fn name(&self) -> &str {
        match self {
            Self::ProjectNotFound { name } | Self::ProjectResolution { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProjectNotFound { .. } => "project_not_found",
            Self::ProjectResolution { .. } => "project_resolution",
        }
    }

    /// Shows the error as a console error block.
    pub fn report(&self, console: &mut dyn Console) -> anyhow::Result<()> {
        console.error(&self.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// No selection was made.
    Idle,
    Rendered(String),
}

/// Resolves `selected` in `registry` and renders it once.
pub fn dispatch<R: Routine>(
    selected: Option<&str>,
    registry: &ProjectRegistry<R>,
    ctx: &mut RenderContext<'_>,
) -> Result<Dispatched, DispatchError> {
    let Some(name) = selected.filter(|name| !name.trim().is_empty()) else {
        return Ok(Dispatched::Idle);
    };
    let routine = registry
        .get(name)
        .ok_or_else(|| DispatchError::ProjectNotFound {
            name: name.to_string(),
        })?;
    routine
        .render(ctx)
        .map_err(|err| DispatchError::ProjectResolution {
            name: name.to_string(),
            reason: format!("{err:#}"),
        })?;
    Ok(Dispatched::Rendered(name.to_string()))
}
