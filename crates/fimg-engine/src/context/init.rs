/// Initialization parameters for a hardware context.
///
/// Keep this structure small. Queue length and cache sizes are fixed by the
/// hardware layout and are not configurable here.
#[derive(Debug, Clone)]
pub struct ContextInit {
    /// Shader binds between cache statistics log lines.
    ///
    /// Zero disables the statistics output.
    pub cache_stats_interval: u64,

    /// Initial framebuffer height in pixels, used to mirror scissor
    /// rectangles when `flip_y` is set.
    pub fb_height: u32,

    /// Framebuffer origin is at the top-left instead of the bottom-left.
    pub flip_y: bool,
}

impl Default for ContextInit {
    fn default() -> Self {
        Self {
            cache_stats_interval: 0,
            fb_height: 0,
            flip_y: false,
        }
    }
}
