use electron_inject_core::ConnectionParams;
use tracing::info;
use tracing::warn;

/// Open the debugger's landing page in the desktop browser. Failing to do so
/// is not fatal; the URL is logged so it can be opened by hand.
pub(crate) fn open_devtools(params: &ConnectionParams) {
    let url = params.devtools_url();
    match webbrowser::open(&url) {
        Ok(()) => info!(%url, "opened devtools in browser"),
        Err(e) => warn!(%url, error = %e, "could not open a browser; please open the URL manually"),
    }
}
