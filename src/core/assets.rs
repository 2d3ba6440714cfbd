//! The assets collaborator shared by every state of a controller.

/// Application-owned context that states configure between activations.
///
/// The controller never inspects it beyond this contract. It is reset before
/// every activation, polled once per tick for interactivity, and destroyed
/// when the controller is dropped.
///
/// # Example
///
/// ```rust
/// use phasestack::core::Assets;
///
/// #[derive(Default)]
/// struct BattleAssets {
///     cursor_visible: bool,
///     camera_moving: bool,
/// }
///
/// impl Assets for BattleAssets {
///     fn reset_assets(&mut self) {
///         self.cursor_visible = false;
///     }
///
///     fn suspend_interactivity(&self) -> bool {
///         self.camera_moving
///     }
/// }
/// ```
pub trait Assets: 'static {
    /// Return shared components to their default behavior.
    fn reset_assets(&mut self);

    /// True while interactive updates should wait, e.g. while a camera is
    /// still moving its subject into view.
    fn suspend_interactivity(&self) -> bool {
        false
    }

    /// Release held references. Called once, when the controller is dropped.
    fn destroy(&mut self) {}
}

impl Assets for () {
    fn reset_assets(&mut self) {}
}
