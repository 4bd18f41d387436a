//! Prometheus text exposition rendering of process samples.
//!
//! Every sample renders to exactly six newline-terminated lines, each
//! labelled with `pid`, `command` and `args`.

use std::fmt::Write as FmtWrite;

use crate::process::ProcessSample;

/// Metric names in render order.
pub const METRIC_NAMES: [&str; 6] = [
    "process_cpu_usage",
    "process_memory_usage",
    "process_network_receive_bytes",
    "process_network_transmit_bytes",
    "process_disk_read_bytes",
    "process_disk_write_bytes",
];

/// Lines rendered per sample.
pub const LINES_PER_SAMPLE: usize = METRIC_NAMES.len();

/// Rough per-sample size used to pre-size the document buffer.
pub const SAMPLE_SIZE_HINT: usize = 500;

/// Escapes a label value: backslash, double quote and newline.
pub fn escape_label_value(v: &str) -> std::borrow::Cow<'_, str> {
    if !v.contains(['\\', '"', '\n']) {
        return std::borrow::Cow::Borrowed(v);
    }
    let mut out = String::with_capacity(v.len() + 8);
    for c in v.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    std::borrow::Cow::Owned(out)
}

/// Appends the six metric lines of `sample` to `out`.
pub fn render_sample(out: &mut String, sample: &ProcessSample) {
    let labels = format!(
        "pid=\"{}\",command=\"{}\",args=\"{}\"",
        sample.pid,
        escape_label_value(&sample.command),
        escape_label_value(&sample.args)
    );

    // Writing to a String never fails
    let _ = writeln!(out, "{}{{{}}} {:.2}", METRIC_NAMES[0], labels, sample.cpu_usage);
    let _ = writeln!(out, "{}{{{}}} {}", METRIC_NAMES[1], labels, sample.memory_bytes);
    let _ = writeln!(out, "{}{{{}}} {}", METRIC_NAMES[2], labels, sample.network_receive_bytes);
    let _ = writeln!(out, "{}{{{}}} {}", METRIC_NAMES[3], labels, sample.network_transmit_bytes);
    let _ = writeln!(out, "{}{{{}}} {}", METRIC_NAMES[4], labels, sample.disk_read_bytes);
    let _ = writeln!(out, "{}{{{}}} {}", METRIC_NAMES[5], labels, sample.disk_write_bytes);
}

/// Renders all samples into one document, in slice order.
pub fn render_document(samples: &[ProcessSample]) -> String {
    let mut out = String::with_capacity(samples.len() * SAMPLE_SIZE_HINT);
    for s in samples {
        render_sample(&mut out, s);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, command: &str, args: &str) -> ProcessSample {
        ProcessSample {
            pid,
            command: command.to_string(),
            args: args.to_string(),
            cpu_usage: 12.346,
            memory_bytes: 2097152,
            disk_read_bytes: 4096,
            disk_write_bytes: 512,
            network_receive_bytes: 100,
            network_transmit_bytes: 50,
        }
    }

    #[test]
    fn test_render_sample_lines() {
        let mut out = String::new();
        render_sample(&mut out, &sample(42, "nginx", "-g daemon off;"));

        let expected = "\
process_cpu_usage{pid=\"42\",command=\"nginx\",args=\"-g daemon off;\"} 12.35
process_memory_usage{pid=\"42\",command=\"nginx\",args=\"-g daemon off;\"} 2097152
process_network_receive_bytes{pid=\"42\",command=\"nginx\",args=\"-g daemon off;\"} 100
process_network_transmit_bytes{pid=\"42\",command=\"nginx\",args=\"-g daemon off;\"} 50
process_disk_read_bytes{pid=\"42\",command=\"nginx\",args=\"-g daemon off;\"} 4096
process_disk_write_bytes{pid=\"42\",command=\"nginx\",args=\"-g daemon off;\"} 512
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_cpu_two_decimals() {
        let mut s = sample(1, "init", "");
        s.cpu_usage = 3.0;
        let mut out = String::new();
        render_sample(&mut out, &s);
        assert!(out.starts_with("process_cpu_usage{pid=\"1\",command=\"init\",args=\"\"} 3.00\n"));
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("plain"), "plain");
        assert_eq!(escape_label_value("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_label_value("C:\\path"), "C:\\\\path");
        assert_eq!(escape_label_value("a\nb"), "a\\nb");
    }

    #[test]
    fn test_escaped_newline_keeps_six_lines() {
        let mut out = String::new();
        render_sample(&mut out, &sample(9, "sh", "-c\necho \"x\""));
        assert_eq!(out.lines().count(), LINES_PER_SAMPLE);
    }

    #[test]
    fn test_render_document_empty() {
        assert_eq!(render_document(&[]), "");
    }

    #[test]
    fn test_render_document_order() {
        let doc = render_document(&[sample(1, "a", ""), sample(7, "b", "")]);
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines.len(), 2 * LINES_PER_SAMPLE);
        assert!(lines[0].contains("pid=\"1\""));
        assert!(lines[LINES_PER_SAMPLE].contains("pid=\"7\""));
    }
}
