//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use futures::{future::BoxFuture, FutureExt as _, TryFutureExt as _};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a spawned [`Task`].
type TaskError = Box<dyn Error + Send + 'static>;

/// Background environment for running [`Task`]s.
#[derive(Debug, Default)]
pub struct Background {
    /// Set of spawned tasks.
    set: task::JoinSet<Result<(), TaskError>>,
}

impl Background {
    /// Spawns a new [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Error + Send + 'static,
    {
        _ = self
            .set
            .spawn(future.map_err(|e| -> TaskError { Box::new(e) }));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(mut self) -> Self::IntoFuture {
        async move {
            while let Some(joined) = self.set.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(e) => {
                        let e: TaskError = Box::new(e);
                        return Err(e);
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }
}
