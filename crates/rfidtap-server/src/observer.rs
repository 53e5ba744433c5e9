use rfidtap_frame::{AssembleError, ChecksumStatus, FrameError, FrameReport};
use tracing::{info, warn};

/// Receives the outcome of every chunk a session processes.
pub trait FrameObserver {
    fn on_frame(&mut self, report: &FrameReport);

    fn on_malformed(&mut self, chunk: &[u8], error: &FrameError);

    fn on_overflow(&mut self, _error: &AssembleError) {}
}

impl<T: FrameObserver + ?Sized> FrameObserver for &mut T {
    fn on_frame(&mut self, report: &FrameReport) {
        (**self).on_frame(report);
    }

    fn on_malformed(&mut self, chunk: &[u8], error: &FrameError) {
        (**self).on_malformed(chunk, error);
    }

    fn on_overflow(&mut self, error: &AssembleError) {
        (**self).on_overflow(error);
    }
}

/// Human-readable frame reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl FrameObserver for ConsoleObserver {
    fn on_frame(&mut self, report: &FrameReport) {
        let frame = &report.frame;
        info!(
            client_data = %report.tokens.join(" "),
            head = %format_args!("{:02x}", frame.header()),
            frame_type = %format_args!("{:02x}", frame.type_byte()),
            len = %format_args!("{:02x}", frame.length()),
            data = %hex_list(frame.payload()),
            crc = %format_args!("{:02x}", frame.checksum()),
            summed = %format_args!("{:02x}", report.computed_checksum),
            "frame received"
        );

        match report.status {
            ChecksumStatus::Valid => info!("Valid data. (Checksums match)"),
            ChecksumStatus::Invalid { received, computed } => warn!(
                received = %format_args!("{received:02x}"),
                computed = %format_args!("{computed:02x}"),
                "Invalid data. (Checksums do not match)"
            ),
        }

        if report.kind.is_recognized() {
            info!(kind = %report.kind, "{}", report.kind.label());
        } else {
            warn!(kind = %report.kind, "{}", report.kind.label());
        }

        if report.trailing_bytes > 0 {
            info!(
                trailing_bytes = report.trailing_bytes,
                "bytes after checksum ignored"
            );
        }
    }

    fn on_malformed(&mut self, chunk: &[u8], error: &FrameError) {
        warn!(client_data = %hex_list(chunk), %error, "malformed frame, skipped");
    }

    fn on_overflow(&mut self, error: &AssembleError) {
        warn!(%error, "reassembly buffer overflow, pending bytes dropped");
    }
}

fn hex_list(bytes: &[u8]) -> String {
    rfidtap_frame::tokens(bytes).join(" ")
}
