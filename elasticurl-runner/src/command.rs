use elasticurl_core::{Invocation, Result, DEFAULT_BUILD_TOOL, ENTRY_POINT_CLASS};
use std::io::Write;
use tracing::debug;

/// Maven goal that runs a class with the project classpath
pub const EXEC_GOAL: &str = "exec:java";

/// Classpath scope the entry point lives in
pub const CLASSPATH_SCOPE: &str = "test";

/// Build the Maven invocation for the elasticurl test entry point and print
/// its argument list and command line.
pub fn build_command(args: &[String]) -> Result<Invocation> {
    build_command_with(DEFAULT_BUILD_TOOL, args)
}

/// Same as [`build_command`] with a different build tool program, e.g. `mvnw`.
pub fn build_command_with(build_tool: &str, args: &[String]) -> Result<Invocation> {
    let mut stdout = std::io::stdout();
    build_command_with_output(build_tool, args, &mut stdout)
}

/// Like [`build_command_with`], with the two diagnostic lines going to `out`.
pub fn build_command_with_output<W: Write>(
    build_tool: &str,
    args: &[String],
    out: &mut W,
) -> Result<Invocation> {
    let invocation = assemble(build_tool, args);

    writeln!(out, "{:?}", invocation.argv())?;
    writeln!(out, "{}", invocation.command_line())?;
    out.flush()?;

    Ok(invocation)
}

fn assemble(build_tool: &str, args: &[String]) -> Invocation {
    let payload = args.join(" ");

    debug!(build_tool = %build_tool, arg_count = args.len(), "Assembling elasticurl command");

    // No shell in between, so the OS receives the property values bare.
    let argv = vec![
        "-e".to_string(),
        EXEC_GOAL.to_string(),
        format!("-Dexec.classpathScope={}", CLASSPATH_SCOPE),
        format!("-Dexec.mainClass={}", ENTRY_POINT_CLASS),
        format!("-Dexec.args={}", payload),
    ];

    let command_line = format!(
        "{} -e {} -Dexec.classpathScope=\"{}\" -Dexec.mainClass=\"{}\" -Dexec.args=\"{}\"",
        build_tool, EXEC_GOAL, CLASSPATH_SCOPE, ENTRY_POINT_CLASS, payload
    );

    Invocation::new(build_tool, argv).with_command_line(command_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_line_matches_template() {
        let invocation = build_command(&args(&["-v", "ERROR", "https://example.com"])).unwrap();

        assert_eq!(
            invocation.command_line(),
            "mvn -e exec:java -Dexec.classpathScope=\"test\" \
             -Dexec.mainClass=\"software.amazon.awssdk.crt.test.Elasticurl\" \
             -Dexec.args=\"-v ERROR https://example.com\""
        );
    }

    #[test]
    fn test_empty_args_give_empty_payload() {
        let invocation = build_command(&[]).unwrap();

        assert!(invocation.command_line().ends_with("-Dexec.args=\"\""));
        assert_eq!(invocation.args.last().unwrap(), "-Dexec.args=");
    }

    #[test]
    fn test_args_are_embedded_verbatim() {
        let invocation = build_command(&args(&["-H", "x-test: a\"b", "--http2"])).unwrap();

        assert!(invocation
            .command_line()
            .contains("-Dexec.args=\"-H x-test: a\"b --http2\""));
        assert_eq!(
            invocation.args.last().unwrap(),
            "-Dexec.args=-H x-test: a\"b --http2"
        );
    }

    #[test]
    fn test_argv_is_discrete() {
        let invocation = build_command(&args(&["-P", "https://example.com"])).unwrap();

        assert_eq!(invocation.program, "mvn");
        assert_eq!(
            invocation.args,
            vec![
                "-e",
                "exec:java",
                "-Dexec.classpathScope=test",
                "-Dexec.mainClass=software.amazon.awssdk.crt.test.Elasticurl",
                "-Dexec.args=-P https://example.com",
            ]
        );
    }

    #[test]
    fn test_custom_build_tool() {
        let invocation = build_command_with("./mvnw", &args(&["-i"])).unwrap();

        assert_eq!(invocation.program, "./mvnw");
        assert!(invocation.command_line().starts_with("./mvnw -e exec:java "));
    }

    #[test]
    fn test_prints_argv_then_command_line() {
        let mut out = Vec::new();
        let invocation =
            build_command_with_output("mvn", &args(&["-v", "ERROR"]), &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "[\"mvn\", \"-e\", \"exec:java\", \"-Dexec.classpathScope=test\", \
             \"-Dexec.mainClass=software.amazon.awssdk.crt.test.Elasticurl\", \
             \"-Dexec.args=-v ERROR\"]"
        );
        assert_eq!(lines[1], invocation.command_line());
    }

    #[test]
    fn test_prints_even_with_no_args() {
        let mut out = Vec::new();
        build_command_with_output("mvn", &[], &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 2);
        assert!(printed.ends_with("-Dexec.args=\"\"\n"));
    }
}
