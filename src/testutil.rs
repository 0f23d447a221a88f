//! Recording fakes for the subprocess and network seams.

use std::{cell::RefCell, collections::VecDeque, path::Path};

use crate::{
    cmd::{Cmd, Runner},
    error::Error,
    net::Network,
};

#[derive(Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<Cmd>>,
    outputs: RefCell<VecDeque<String>>,
    fail_on: Option<String>,
    hook: Option<Box<dyn Fn(&Cmd)>>,
}

impl FakeRunner {
    pub fn with_outputs<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FakeRunner {
            outputs: RefCell::new(outputs.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Makes every invocation of `program` exit with status 1.
    pub fn fail_on(mut self, program: &str) -> Self {
        self.fail_on = Some(program.to_string());
        self
    }

    /// Runs `hook` for every successful `status` call, before it returns.
    pub fn on_status(mut self, hook: impl Fn(&Cmd) + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<Cmd> {
        self.calls.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|cmd| cmd.to_string()).collect()
    }

    fn record(&self, cmd: &Cmd) -> Result<(), Error> {
        self.calls.borrow_mut().push(cmd.clone());
        if self.fail_on.as_deref() == Some(cmd.program.as_str()) {
            return Err(Error::CommandFailed {
                program: cmd.program.clone(),
                code: Some(1),
            });
        }
        Ok(())
    }
}

impl Runner for FakeRunner {
    fn status(&self, cmd: &Cmd) -> Result<(), Error> {
        self.record(cmd)?;
        if let Some(hook) = &self.hook {
            hook(cmd);
        }
        Ok(())
    }

    fn output(&self, cmd: &Cmd) -> Result<String, Error> {
        self.record(cmd)?;
        Ok(self.outputs.borrow_mut().pop_front().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeNetwork {
    text: Option<String>,
    payload: Vec<u8>,
    requests: RefCell<Vec<String>>,
}

impl FakeNetwork {
    pub fn with_text(text: &str) -> Self {
        FakeNetwork {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn with_payload(payload: &[u8]) -> Self {
        FakeNetwork {
            payload: payload.to_vec(),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Network for FakeNetwork {
    async fn get_text(&self, url: &str) -> Result<String, Error> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(self.text.clone().unwrap_or_default())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), Error> {
        self.requests.borrow_mut().push(url.to_string());
        std::fs::write(dest, &self.payload).map_err(Error::file(dest))
    }
}
