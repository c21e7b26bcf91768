use crate::playback::transport::{PlaybackError, SourceId, Transport, TransportEvent};
use crate::types::experience::BackendKind;
use gst::prelude::*;
use gstreamer as gst;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// `playbin`-backed transport. `HostedVideo` sources are played with their
/// video and subtitle streams switched off.
pub struct GstTransport {
    kind: BackendKind,
    volume: f64,
    current: Option<LoadedSource>,
}

struct LoadedSource {
    id: SourceId,
    playbin: gst::Element,
    bus: gst::Bus,
    announced: bool,
}

impl GstTransport {
    pub fn new(kind: BackendKind) -> Result<Self, PlaybackError> {
        gst::init().map_err(|e| PlaybackError::Backend(e.to_string()))?;
        Ok(Self {
            kind,
            volume: 1.0,
            current: None,
        })
    }

    fn build_playbin(&self, url: &str) -> Result<gst::Element, PlaybackError> {
        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", url)
            .build()
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        if self.kind == BackendKind::HostedVideo {
            audio_only(&playbin)?;
        }
        playbin.set_property("volume", self.volume);
        Ok(playbin)
    }

    fn playbin(&self) -> Result<&gst::Element, PlaybackError> {
        self.current
            .as_ref()
            .map(|source| &source.playbin)
            .ok_or_else(|| PlaybackError::Backend("no source loaded".to_string()))
    }
}

fn audio_only(playbin: &gst::Element) -> Result<(), PlaybackError> {
    let unsupported = || PlaybackError::Backend("playbin flags unavailable".to_string());
    let flags = playbin.property_value("flags");
    let flags_class = gst::glib::FlagsClass::with_type(flags.type_()).ok_or_else(unsupported)?;
    let flags = flags_class
        .builder_with_value(flags)
        .ok_or_else(unsupported)?
        .unset_by_nick("video")
        .unset_by_nick("text")
        .build()
        .ok_or_else(unsupported)?;
    playbin.set_property_from_value("flags", &flags);
    Ok(())
}

fn clock_seconds(time: gst::ClockTime) -> f64 {
    time.nseconds() as f64 / NANOS_PER_SECOND
}

fn query_duration(playbin: &gst::Element) -> Option<f64> {
    playbin
        .query_duration::<gst::ClockTime>()
        .map(clock_seconds)
        .filter(|d| *d > 0.0)
}

impl Transport for GstTransport {
    fn load(&mut self, source: SourceId, url: &str) -> Result<(), PlaybackError> {
        self.teardown();
        let playbin = self.build_playbin(url)?;
        let bus = playbin
            .bus()
            .ok_or_else(|| PlaybackError::Backend("playbin has no bus".to_string()))?;
        // Prerolls asynchronously; AsyncDone on the bus marks metadata ready.
        if let Err(e) = playbin.set_state(gst::State::Paused) {
            let _ = playbin.set_state(gst::State::Null);
            return Err(PlaybackError::Load(e.to_string()));
        }
        self.current = Some(LoadedSource {
            id: source,
            playbin,
            bus,
            announced: false,
        });
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.playbin()?
            .set_state(gst::State::Playing)
            .map(|_| ())
            .map_err(|e| PlaybackError::Rejected(e.to_string()))
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.playbin()?
            .set_state(gst::State::Paused)
            .map(|_| ())
            .map_err(|e| PlaybackError::Backend(e.to_string()))
    }

    fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        let nanos = (seconds.max(0.0) * NANOS_PER_SECOND) as u64;
        self.playbin()?
            .seek_simple(
                gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                gst::ClockTime::from_nseconds(nanos),
            )
            .map_err(|e| PlaybackError::Backend(e.to_string()))
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        if let Some(source) = &self.current {
            source.playbin.set_property("volume", volume);
        }
    }

    fn position(&self) -> Option<f64> {
        self.current
            .as_ref()?
            .playbin
            .query_position::<gst::ClockTime>()
            .map(clock_seconds)
    }

    fn duration(&self) -> Option<f64> {
        query_duration(&self.current.as_ref()?.playbin)
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        let Some(current) = self.current.as_mut() else {
            return events;
        };
        let source = current.id;
        while let Some(msg) = current.bus.pop() {
            use gst::MessageView;
            match msg.view() {
                MessageView::AsyncDone(..) if !current.announced => {
                    current.announced = true;
                    events.push(TransportEvent::Loaded {
                        source,
                        duration: query_duration(&current.playbin),
                    });
                }
                MessageView::DurationChanged(..) => {
                    if let Some(duration) = query_duration(&current.playbin) {
                        events.push(TransportEvent::DurationChanged { source, duration });
                    }
                }
                MessageView::Eos(..) => events.push(TransportEvent::Ended { source }),
                MessageView::Error(err) => events.push(TransportEvent::Failed {
                    source,
                    message: match err.debug() {
                        Some(debug) => format!("{} ({})", err.error(), debug),
                        None => err.error().to_string(),
                    },
                }),
                _ => (),
            }
        }
        events
    }

    fn teardown(&mut self) {
        if let Some(source) = self.current.take() {
            source.bus.set_flushing(true);
            if let Err(e) = source.playbin.set_state(gst::State::Null) {
                log::warn!("tearing down source {} failed: {}", source.id, e);
            }
        }
    }
}

impl Drop for GstTransport {
    fn drop(&mut self) {
        self.teardown();
    }
}
