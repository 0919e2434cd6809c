//! Phone call dispatch and numeric keypad.
//!
//! # Responsibility
//! - Build `tel:` call requests and gate them on the platform call
//!   permission.
//! - Hold the keypad's dialed-number buffer.
//!
//! # Invariants
//! - A call is never placed while permission is missing; the permission
//!   request does not retry the call afterwards.
//! - Numbers are not validated here. Keypad input is dialed as typed.

use log::info;

const TEL_SCHEME: &str = "tel:";

/// Platform "place call" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    uri: String,
}

impl CallRequest {
    /// Builds a `tel:<number>` request without validating `number`.
    pub fn for_number(number: &str) -> Self {
        Self {
            uri: format!("{TEL_SCHEME}{number}"),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Number part of the request URI.
    pub fn number(&self) -> &str {
        &self.uri[TEL_SCHEME.len()..]
    }
}

/// Host platform call/permission surface.
///
/// Implemented by the mobile shell; all calls are fire-and-forget.
pub trait CallPlatform {
    fn has_call_permission(&self) -> bool;
    /// Shows the platform permission prompt. The outcome is not reported back.
    fn request_call_permission(&self);
    fn place_call(&self, request: &CallRequest);
}

/// What [`dispatch_call`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Placed,
    /// The user must trigger the call again once permission is granted.
    PermissionRequested,
}

/// Places a call to `number`, or requests the call permission first.
pub fn dispatch_call(platform: &impl CallPlatform, number: &str) -> CallOutcome {
    if !platform.has_call_permission() {
        info!("event=call_dispatch module=dialer status=deferred reason=permission_missing");
        platform.request_call_permission();
        return CallOutcome::PermissionRequested;
    }

    let request = CallRequest::for_number(number);
    platform.place_call(&request);
    info!(
        "event=call_dispatch module=dialer status=ok digits={}",
        number.chars().count()
    );
    CallOutcome::Placed
}

/// One key on the dial pad: `0-9`, `*` or `#`.
///
/// Only constructible through the checked constructors, so a key always
/// maps to exactly the symbol it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypadKey(char);

impl KeypadKey {
    pub const STAR: Self = Self('*');
    pub const HASH: Self = Self('#');

    /// Digit key for `0..=9`; anything larger is `None`.
    pub fn digit(value: u8) -> Option<Self> {
        (value <= 9).then(|| Self(char::from(b'0' + value)))
    }

    /// Maps a character to a key; anything outside ASCII `0-9*#` is `None`.
    pub fn from_char(value: char) -> Option<Self> {
        matches!(value, '0'..='9' | '*' | '#').then_some(Self(value))
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

/// Dialed-number buffer of the keypad screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypad {
    number: String,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn press(&mut self, key: KeypadKey) {
        self.number.push(key.as_char());
    }

    /// Presses every supported key in `input`, skipping other characters.
    pub fn type_str(&mut self, input: &str) {
        for key in input.chars().filter_map(KeypadKey::from_char) {
            self.press(key);
        }
    }

    pub fn backspace(&mut self) {
        self.number.pop();
    }

    pub fn clear(&mut self) {
        self.number.clear();
    }

    /// Dials the buffer. An empty buffer does nothing and returns `None`.
    ///
    /// The buffer is kept so the user can redial after granting permission.
    pub fn dial(&self, platform: &impl CallPlatform) -> Option<CallOutcome> {
        if self.number.is_empty() {
            return None;
        }
        Some(dispatch_call(platform, &self.number))
    }
}
