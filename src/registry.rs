//! Registry of pixel data handlers and capability negotiation.
//!
//! The process-wide registry is built once, when first used,
//! with the built-in handlers in a fixed priority order;
//! codec dependency presence is probed at that point
//! (from the cargo features the crate was compiled with)
//! and the registry is read-only thereafter,
//! so lookups from multiple threads need no locking.

use lazy_static::lazy_static;
use tracing::debug;

use crate::handlers::{self, DecodedPixelBytes, PixelDecoder, ProcessOutcome};
use crate::source::PixelDataSource;
use crate::uids;
use crate::{MissingDependencySnafu, Result, UnknownTransferSyntaxSnafu};

/// What a registry can do for a given transfer syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// No registered handler targets the transfer syntax.
    Cannot,
    /// A handler targets it, but its dependency is missing;
    /// the message tells the user what to enable.
    Could { message: String },
    /// A handler with its dependency present targets it.
    Can,
}

/// Whether a handler's codec dependency was compiled in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Availability {
    /// The dependency is present; the handler can decode.
    Available,
    /// The dependency is missing; the remedy names what to enable.
    Missing { remedy: &'static str },
}

/// A registered pixel data handler:
/// the transfer syntaxes it targets,
/// whether its dependency is present,
/// and the handler object itself.
pub struct DecoderDescriptor {
    name: &'static str,
    encodings: &'static [&'static str],
    availability: Availability,
    handler: &'static (dyn PixelDecoder + Send + Sync),
}

impl std::fmt::Debug for DecoderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DecoderDescriptor")
            .field("name", &self.name)
            .field("encodings", &self.encodings)
            .field("availability", &self.availability)
            .finish()
    }
}

impl DecoderDescriptor {
    pub fn new(
        name: &'static str,
        encodings: &'static [&'static str],
        availability: Availability,
        handler: &'static (dyn PixelDecoder + Send + Sync),
    ) -> Self {
        DecoderDescriptor {
            name,
            encodings,
            availability,
            handler,
        }
    }

    /// The handler's diagnostic name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this handler targets the given transfer syntax.
    pub fn targets(&self, uid: &str) -> bool {
        self.encodings.contains(&uid)
    }

    /// Whether the handler's dependency is present.
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// The handler object.
    pub fn handler(&self) -> &'static (dyn PixelDecoder + Send + Sync) {
        self.handler
    }
}

/// An ordered collection of pixel data handlers.
///
/// Registration order is the tie break:
/// among handlers targeting the same transfer syntax,
/// the one registered first is tried first.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: Vec<DecoderDescriptor>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry {
            entries: Vec::new(),
        }
    }

    /// Add a handler descriptor at the end of the priority order.
    pub fn register(&mut self, descriptor: DecoderDescriptor) {
        self.entries.push(descriptor);
    }

    /// Report whether some handler can, could, or cannot
    /// decode the given transfer syntax.
    pub fn capability_for(&self, uid: &str) -> Capability {
        let uid = trim_uid(uid);
        let mut remedies: Vec<&str> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.targets(uid)) {
            match entry.availability {
                Availability::Available => return Capability::Can,
                Availability::Missing { remedy } => remedies.push(remedy),
            }
        }
        if remedies.is_empty() {
            Capability::Cannot
        } else {
            Capability::Could {
                message: remedies.join("; "),
            }
        }
    }

    /// Return the first available handler targeting the transfer syntax,
    /// in registration order.
    ///
    /// When every targeting handler lacks its dependency,
    /// the error aggregates their remediation messages
    /// so the caller can report what to enable.
    pub fn select_handler(&self, uid: &str) -> Result<&DecoderDescriptor> {
        let uid = trim_uid(uid);
        let mut remedies: Vec<&str> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.targets(uid)) {
            match entry.availability {
                Availability::Available => return Ok(entry),
                Availability::Missing { remedy } => remedies.push(remedy),
            }
        }
        if remedies.is_empty() {
            UnknownTransferSyntaxSnafu { uid }.fail()
        } else {
            MissingDependencySnafu {
                uid,
                guidance: remedies.join("; "),
            }
            .fail()
        }
    }

    /// Decode the given dataset's pixel data into flat sample bytes,
    /// dispatching over the handlers targeting its transfer syntax.
    ///
    /// A handler returning the unavailable sentinel is recoverable:
    /// the next candidate is tried,
    /// and its message joins the aggregated guidance
    /// should every candidate fall through.
    /// Decode failures are not retried.
    pub fn decode(&self, src: &dyn PixelDataSource) -> Result<DecodedPixelBytes> {
        let uid = trim_uid(src.transfer_syntax_uid()).to_owned();
        let mut guidance: Vec<String> = Vec::new();
        let mut targeted = false;

        for entry in self.entries.iter().filter(|e| e.targets(&uid)) {
            targeted = true;
            match entry.availability {
                Availability::Missing { remedy } => {
                    guidance.push(remedy.to_owned());
                    continue;
                }
                Availability::Available => {}
            }
            match entry.handler.process(src)? {
                ProcessOutcome::Decoded(decoded) => {
                    debug!(handler = entry.name, ts = %uid, "decoded pixel data");
                    return Ok(decoded);
                }
                ProcessOutcome::Unavailable { message } => {
                    debug!(handler = entry.name, ts = %uid, "handler unavailable, trying next");
                    guidance.push(message);
                }
            }
        }

        if !targeted {
            UnknownTransferSyntaxSnafu { uid }.fail()
        } else {
            MissingDependencySnafu {
                uid,
                guidance: guidance.join("; "),
            }
            .fail()
        }
    }
}

/// Trim the trailing NUL byte that padded UIDs carry.
fn trim_uid(uid: &str) -> &str {
    uid.strip_suffix('\0').unwrap_or(uid)
}

lazy_static! {
    static ref HANDLERS: HandlerRegistry = initialize_handlers();
}

/// Retrieve the process-wide handler registry.
pub fn handlers() -> &'static HandlerRegistry {
    &HANDLERS
}

fn initialize_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry.register(DecoderDescriptor::new(
        "native",
        uids::NATIVE,
        Availability::Available,
        &handlers::native::NativeHandler,
    ));

    registry.register(DecoderDescriptor::new(
        "jpeg",
        uids::JPEG,
        if cfg!(feature = "jpeg") {
            Availability::Available
        } else {
            Availability::Missing {
                remedy: handlers::jpeg::REMEDY,
            }
        },
        &handlers::jpeg::JpegHandler,
    ));

    registry.register(DecoderDescriptor::new(
        "jpeg-ls",
        uids::JPEG_LS,
        if cfg!(feature = "charls") {
            Availability::Available
        } else {
            Availability::Missing {
                remedy: handlers::jpegls::REMEDY,
            }
        },
        &handlers::jpegls::JpegLsHandler,
    ));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// A handler that always succeeds with a fixed byte.
    struct FixedHandler(u8);

    impl PixelDecoder for FixedHandler {
        fn process(&self, _src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
            Ok(ProcessOutcome::Decoded(DecodedPixelBytes {
                data: vec![self.0],
                byte_order: None,
            }))
        }
    }

    /// A handler whose dependency check only fails at process time.
    struct FlakyHandler(&'static str);

    impl PixelDecoder for FlakyHandler {
        fn process(&self, _src: &dyn PixelDataSource) -> Result<ProcessOutcome> {
            Ok(ProcessOutcome::Unavailable {
                message: self.0.to_owned(),
            })
        }
    }

    struct DummySource;

    impl PixelDataSource for DummySource {
        fn transfer_syntax_uid(&self) -> &str {
            "1.2.3.4"
        }
        fn rows(&self) -> Option<u16> {
            Some(1)
        }
        fn cols(&self) -> Option<u16> {
            Some(1)
        }
        fn samples_per_pixel(&self) -> Option<u16> {
            Some(1)
        }
        fn bits_allocated(&self) -> Option<u16> {
            Some(8)
        }
        fn pixel_representation(&self) -> Option<crate::PixelRepresentation> {
            Some(crate::PixelRepresentation::Unsigned)
        }
        fn number_of_frames(&self) -> Option<u32> {
            None
        }
        fn byte_order(&self) -> byteordered::Endianness {
            byteordered::Endianness::Little
        }
        fn raw_pixel_data(&self) -> Option<crate::RawPixelData> {
            None
        }
    }

    static HANDLER_A: FixedHandler = FixedHandler(0xA);
    static HANDLER_B: FixedHandler = FixedHandler(0xB);
    static FLAKY: FlakyHandler = FlakyHandler("flaky is out to lunch");

    const TS: &str = "1.2.3.4";

    fn missing(remedy: &'static str) -> Availability {
        Availability::Missing { remedy }
    }

    #[test]
    fn capability_reporting() {
        let mut registry = HandlerRegistry::new();
        registry.register(DecoderDescriptor::new(
            "one",
            &["1.2.3.4"],
            missing("install one"),
            &HANDLER_A,
        ));

        assert_eq!(registry.capability_for("9.9.9"), Capability::Cannot);
        assert_eq!(
            registry.capability_for(TS),
            Capability::Could {
                message: "install one".into()
            }
        );

        registry.register(DecoderDescriptor::new(
            "two",
            &["1.2.3.4"],
            Availability::Available,
            &HANDLER_B,
        ));
        assert_eq!(registry.capability_for(TS), Capability::Can);
        // a padded UID resolves the same way
        assert_eq!(registry.capability_for("1.2.3.4\0"), Capability::Can);
    }

    #[test]
    fn select_prefers_available_over_could() {
        let mut registry = HandlerRegistry::new();
        registry.register(DecoderDescriptor::new(
            "could",
            &["1.2.3.4"],
            missing("install could"),
            &HANDLER_A,
        ));
        registry.register(DecoderDescriptor::new(
            "can",
            &["1.2.3.4"],
            Availability::Available,
            &HANDLER_B,
        ));

        let selected = registry.select_handler(TS).unwrap();
        assert_eq!(selected.name(), "can");
    }

    #[test]
    fn select_respects_registration_order() {
        let mut registry = HandlerRegistry::new();
        registry.register(DecoderDescriptor::new(
            "first",
            &["1.2.3.4"],
            Availability::Available,
            &HANDLER_A,
        ));
        registry.register(DecoderDescriptor::new(
            "second",
            &["1.2.3.4"],
            Availability::Available,
            &HANDLER_B,
        ));
        assert_eq!(registry.select_handler(TS).unwrap().name(), "first");
    }

    #[test]
    fn select_aggregates_all_could_messages() {
        let mut registry = HandlerRegistry::new();
        registry.register(DecoderDescriptor::new(
            "one",
            &["1.2.3.4"],
            missing("install one"),
            &HANDLER_A,
        ));
        registry.register(DecoderDescriptor::new(
            "two",
            &["1.2.3.4"],
            missing("install two"),
            &HANDLER_B,
        ));

        match registry.select_handler(TS) {
            Err(Error::MissingDependency { guidance, .. }) => {
                assert!(guidance.contains("install one"));
                assert!(guidance.contains("install two"));
            }
            other => panic!("unexpected result: {:?}", other.map(|d| d.name())),
        }
    }

    #[test]
    fn select_unknown_uid() {
        let registry = HandlerRegistry::new();
        assert!(matches!(
            registry.select_handler("9.9.9"),
            Err(Error::UnknownTransferSyntax { .. })
        ));
    }

    #[test]
    fn decode_falls_back_past_runtime_unavailable() {
        let mut registry = HandlerRegistry::new();
        registry.register(DecoderDescriptor::new(
            "flaky",
            &["1.2.3.4"],
            Availability::Available,
            &FLAKY,
        ));
        registry.register(DecoderDescriptor::new(
            "solid",
            &["1.2.3.4"],
            Availability::Available,
            &HANDLER_B,
        ));

        let decoded = registry.decode(&DummySource).unwrap();
        assert_eq!(decoded.data, vec![0xB]);
    }

    #[test]
    fn decode_aggregates_unavailable_messages() {
        let mut registry = HandlerRegistry::new();
        registry.register(DecoderDescriptor::new(
            "flaky",
            &["1.2.3.4"],
            Availability::Available,
            &FLAKY,
        ));
        registry.register(DecoderDescriptor::new(
            "missing",
            &["1.2.3.4"],
            missing("install missing"),
            &HANDLER_A,
        ));

        match registry.decode(&DummySource) {
            Err(Error::MissingDependency { guidance, .. }) => {
                assert!(guidance.contains("out to lunch"));
                assert!(guidance.contains("install missing"));
            }
            other => panic!("unexpected result: {:?}", other.map(|d| d.data)),
        }
    }

    #[test]
    fn built_in_registry_handles_native_syntaxes() {
        let registry = handlers();
        assert_eq!(
            registry.capability_for(uids::EXPLICIT_VR_LITTLE_ENDIAN),
            Capability::Can
        );
        assert_eq!(
            registry.capability_for(uids::EXPLICIT_VR_BIG_ENDIAN),
            Capability::Can
        );
        assert_eq!(registry.capability_for("1.2.840.10008.1.2.4.100"), Capability::Cannot);
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn built_in_registry_handles_jpeg_when_enabled() {
        assert_eq!(
            handlers().capability_for(uids::JPEG_BASELINE),
            Capability::Can
        );
    }

    #[cfg(not(feature = "charls"))]
    #[test]
    fn built_in_registry_reports_jpegls_remedy() {
        match handlers().capability_for(uids::JPEG_LS_LOSSLESS) {
            Capability::Could { message } => assert!(message.contains("charls")),
            other => panic!("unexpected capability: {:?}", other),
        }
    }
}
