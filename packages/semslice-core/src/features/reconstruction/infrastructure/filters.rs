//! Identifier filter tables
//!
//! Used when deciding which identifiers in a slice still need a local
//! declaration: language keywords, the common libc surface, well-known
//! macros, and shape heuristics for externals.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

pub static C_KEYWORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "if", "else", "while", "for", "do", "switch", "case", "default", "break", "continue",
        "return", "goto", "sizeof", "typedef", "struct", "union", "enum", "int", "char", "float",
        "double", "void", "long", "short", "unsigned", "signed", "const", "static", "extern",
        "auto", "register", "volatile", "inline", "restrict", "class", "public", "private",
        "protected", "virtual", "template", "namespace", "using", "try", "catch", "throw", "new",
        "delete",
    ]
    .into_iter()
    .collect()
});

pub static LIBC_FUNCTIONS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        // stdio.h
        "printf", "scanf", "sprintf", "snprintf", "fprintf", "fscanf", "sscanf", "vprintf",
        "vsprintf", "vsnprintf", "vfprintf", "fopen", "fclose", "fread", "fwrite", "fgets",
        "fputs", "fgetc", "fputc", "fseek", "ftell", "rewind", "feof", "ferror", "clearerr",
        "putchar", "getchar", "puts", "gets", "perror",
        // stdlib.h
        "malloc", "calloc", "realloc", "free", "exit", "abort", "atexit", "atoi", "atof", "atol",
        "strtod", "strtol", "strtoul", "rand", "srand", "system", "getenv", "qsort", "bsearch",
        "abs", "labs", "div", "ldiv",
        // string.h
        "strlen", "strcpy", "strncpy", "strcat", "strncat", "strcmp", "strncmp", "strchr",
        "strrchr", "strstr", "strtok", "memcpy", "memmove", "memset", "memcmp", "memchr",
        "strdup", "strerror", "strcoll", "strxfrm", "strspn", "strcspn", "strpbrk",
        // ctype.h
        "isalpha", "isdigit", "isalnum", "isspace", "isupper", "islower", "isprint", "isgraph",
        "iscntrl", "ispunct", "isxdigit", "toupper", "tolower",
        // math.h
        "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "sinh", "cosh", "tanh", "exp",
        "log", "log10", "pow", "sqrt", "ceil", "floor", "fabs", "fmod",
        // time.h
        "time", "clock", "difftime", "mktime", "strftime", "asctime", "ctime", "gmtime",
        "localtime",
        // assert.h
        "assert",
        // POSIX
        "open", "close", "read", "write", "lseek", "fcntl", "ioctl", "fork", "exec", "wait",
        "pipe", "dup", "dup2", "chdir", "getcwd", "mkdir", "rmdir", "unlink", "rename", "stat",
        "fstat", "access", "chmod", "chown", "getpid", "getppid", "getuid", "getgid", "setuid",
        "setgid", "signal", "kill", "alarm", "sleep", "usleep", "pthread_create", "pthread_join",
        "pthread_exit", "pthread_mutex_lock",
    ]
    .into_iter()
    .collect()
});

pub static COMMON_MACROS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "NULL", "TRUE", "FALSE", "EOF", "BUFSIZ", "STDIN", "STDOUT", "STDERR", "SEEK_SET",
        "SEEK_CUR", "SEEK_END", "SIZE_MAX", "SSIZE_MAX", "INT_MAX", "INT_MIN", "UINT_MAX",
        "LONG_MAX", "LONG_MIN", "ULONG_MAX", "CHAR_MAX", "CHAR_MIN", "UCHAR_MAX", "SHRT_MAX",
        "SHRT_MIN", "USHRT_MAX", "FLT_MAX", "FLT_MIN", "DBL_MAX", "DBL_MIN", "O_RDONLY",
        "O_WRONLY", "O_RDWR", "O_CREAT", "O_TRUNC", "O_APPEND", "S_IRUSR", "S_IWUSR", "S_IXUSR",
        "S_IRWXU", "ENOENT", "EACCES", "EINVAL", "ENOMEM", "EEXIST",
    ]
    .into_iter()
    .collect()
});

/// Prefixes that usually name project-external helpers in large C codebases
pub static EXTERNAL_PREFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "get_", "set_", "find_", "check_", "init_", "free_", "alloc_", "read_", "write_",
        "open_", "close_",
    ]
});

/// Shape heuristics: all-caps names are treated as macros, capitalized
/// names as type names, prefixed names as external helpers.
pub fn is_probable_external(identifier: &str) -> bool {
    if EXTERNAL_PREFIXES
        .iter()
        .any(|prefix| identifier.starts_with(prefix))
    {
        return true;
    }
    let is_macro = identifier.len() > 1
        && identifier
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit());
    if is_macro {
        return true;
    }
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            // Capitalized but not all-caps: probably a type name
            identifier.chars().any(|c| c.is_ascii_lowercase())
        }
        _ => false,
    }
}
