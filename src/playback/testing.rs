//! In-memory transport for session and controller tests.

use crate::playback::transport::{Capabilities, PlaybackError, SourceId, Transport, TransportEvent};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Script {
    pub loaded: Vec<(SourceId, String)>,
    pub events: VecDeque<TransportEvent>,
    pub reject_play: bool,
    pub fail_load: bool,
    pub native_skip: bool,
    pub playing: bool,
    pub position: Option<f64>,
    pub duration: Option<f64>,
    pub volume: f64,
    pub seeks: Vec<f64>,
    pub teardowns: usize,
    pub skips: usize,
}

/// Cloneable handle; clones share one script so tests can drive a transport
/// after handing it to a session.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn script(&self) -> Ref<'_, Script> {
        self.script.borrow()
    }

    pub fn script_mut(&self) -> RefMut<'_, Script> {
        self.script.borrow_mut()
    }

    pub fn push(&self, event: TransportEvent) {
        self.script.borrow_mut().events.push_back(event);
    }

    pub fn last_source(&self) -> Option<SourceId> {
        self.script.borrow().loaded.last().map(|(source, _)| *source)
    }
}

impl Transport for ScriptedTransport {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            native_skip: self.script.borrow().native_skip,
        }
    }

    fn load(&mut self, source: SourceId, url: &str) -> Result<(), PlaybackError> {
        let mut script = self.script.borrow_mut();
        if script.fail_load {
            return Err(PlaybackError::Load(format!("cannot open {url}")));
        }
        script.loaded.push((source, url.to_string()));
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut script = self.script.borrow_mut();
        if script.reject_play {
            return Err(PlaybackError::Rejected("scripted refusal".to_string()));
        }
        script.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.script.borrow_mut().playing = false;
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        self.script.borrow_mut().seeks.push(seconds);
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) {
        self.script.borrow_mut().volume = volume;
    }

    fn position(&self) -> Option<f64> {
        self.script.borrow().position
    }

    fn duration(&self) -> Option<f64> {
        self.script.borrow().duration
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        self.script.borrow_mut().events.drain(..).collect()
    }

    fn teardown(&mut self) {
        let mut script = self.script.borrow_mut();
        script.teardowns += 1;
        script.playing = false;
    }

    fn native_skip(&mut self) -> Result<(), PlaybackError> {
        self.script.borrow_mut().skips += 1;
        Ok(())
    }
}
