//! Arguments naming files: `FileType` opens them while parsing.
use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    sync::{Arc, Mutex},
};

/// Opens a path with the given mode, like `argparse.FileType`.
///
/// `-` names stdin for `r` modes and stdout for the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileType {
    mode: String,
    bufsize: i64,
    encoding: Option<String>,
    errors: Option<String>,
}

impl FileType {
    pub fn new(mode: impl Into<String>) -> FileType {
        FileType { mode: mode.into(), bufsize: -1, encoding: None, errors: None }
    }

    /// `-1` is the default buffer, `0` disables buffering.
    pub fn bufsize(mut self, bufsize: i64) -> FileType {
        self.bufsize = bufsize;
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> FileType {
        self.encoding = Some(encoding.into());
        self
    }

    /// `strict`, `replace` or `ignore`.
    pub fn errors(mut self, errors: impl Into<String>) -> FileType {
        self.errors = Some(errors.into());
        self
    }

    pub fn open(&self, path: &str) -> Result<Handle, String> {
        let mode = Mode::parse(&self.mode)?;
        if let Some(encoding) = &self.encoding {
            let normalized = encoding.to_ascii_lowercase().replace('_', "-");
            if normalized != "utf-8" && normalized != "utf8" {
                return Err(format!("unsupported encoding: '{encoding}'"));
            }
        }
        let errors = match self.errors.as_deref() {
            None | Some("strict") => Errors::Strict,
            Some("replace") => Errors::Replace,
            Some("ignore") => Errors::Ignore,
            Some(other) => return Err(format!("unknown error handler: '{other}'")),
        };

        let stream = if path == "-" {
            if self.mode.contains('r') {
                Stream::Stdin
            } else {
                Stream::Stdout
            }
        } else {
            let file = mode
                .options()
                .open(path)
                .map_err(|err| format!("can't open '{path}': {err}"))?;
            match (self.bufsize, mode.write) {
                // read-write streams are unbuffered
                _ if mode.read && mode.write => Stream::Raw(file),
                (0, _) => Stream::Raw(file),
                (n, false) if n > 0 => Stream::Reader(BufReader::with_capacity(n as usize, file)),
                (n, true) if n > 0 => Stream::Writer(BufWriter::with_capacity(n as usize, file)),
                (_, false) => Stream::Reader(BufReader::new(file)),
                (_, true) => Stream::Writer(BufWriter::new(file)),
            }
        };

        Ok(Handle {
            inner: Arc::new(Inner {
                name: path.to_string(),
                mode: self.mode.clone(),
                binary: mode.binary,
                errors,
                stream: Mutex::new(stream),
            }),
        })
    }
}

struct Mode {
    read: bool,
    write: bool,
    append: bool,
    create: bool,
    create_new: bool,
    truncate: bool,
    binary: bool,
}

impl Mode {
    fn parse(mode: &str) -> Result<Mode, String> {
        let mut res = Mode {
            read: false,
            write: false,
            append: false,
            create: false,
            create_new: false,
            truncate: false,
            binary: false,
        };
        let mut primary = 0;
        for c in mode.chars() {
            match c {
                'r' => {
                    primary += 1;
                    res.read = true;
                }
                'w' => {
                    primary += 1;
                    res.write = true;
                    res.create = true;
                    res.truncate = true;
                }
                'a' => {
                    primary += 1;
                    res.write = true;
                    res.create = true;
                    res.append = true;
                }
                'x' => {
                    primary += 1;
                    res.write = true;
                    res.create_new = true;
                }
                '+' => {
                    res.read = true;
                    res.write = true;
                }
                'b' => res.binary = true,
                't' => res.binary = false,
                _ => return Err(format!("invalid mode: '{mode}'")),
            }
        }
        if primary != 1 {
            return Err(format!("invalid mode: '{mode}'"));
        }
        Ok(res)
    }

    fn options(&self) -> OpenOptions {
        let mut res = OpenOptions::new();
        res.read(self.read)
            .write(self.write && !self.append)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new);
        res
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Errors {
    Strict,
    Replace,
    Ignore,
}

enum Stream {
    Stdin,
    Stdout,
    Raw(File),
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

struct Inner {
    name: String,
    mode: String,
    binary: bool,
    errors: Errors,
    stream: Mutex<Stream>,
}

/// An opened file argument. Clones share the underlying stream.
#[derive(Clone)]
pub struct Handle {
    inner: Arc<Inner>,
}

impl Handle {
    /// The path as given on the command line.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn mode(&self) -> &str {
        &self.inner.mode
    }

    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        match &mut *self.lock() {
            Stream::Stdin => io::stdin().lock().read_to_end(&mut buf)?,
            Stream::Raw(file) => file.read_to_end(&mut buf)?,
            Stream::Reader(reader) => reader.read_to_end(&mut buf)?,
            Stream::Stdout | Stream::Writer(_) => return Err(not_readable()),
        };
        Ok(buf)
    }

    /// Reads the rest of the stream as text, honoring the error policy.
    pub fn read_to_string(&self) -> io::Result<String> {
        if self.inner.binary {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "file opened in binary mode"));
        }
        let bytes = self.read_bytes()?;
        match self.inner.errors {
            Errors::Strict => String::from_utf8(bytes)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err)),
            Errors::Replace => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Errors::Ignore => Ok(bytes.utf8_chunks().map(|it| it.valid()).collect()),
        }
    }

    pub fn read_line(&self, buf: &mut String) -> io::Result<usize> {
        match &mut *self.lock() {
            Stream::Stdin => io::stdin().lock().read_line(buf),
            Stream::Reader(reader) => reader.read_line(buf),
            Stream::Raw(file) => read_line_unbuffered(file, buf),
            Stream::Stdout | Stream::Writer(_) => Err(not_readable()),
        }
    }

    pub fn write_all(&self, data: &[u8]) -> io::Result<()> {
        match &mut *self.lock() {
            Stream::Stdout => io::stdout().lock().write_all(data),
            Stream::Raw(file) => file.write_all(data),
            Stream::Writer(writer) => writer.write_all(data),
            Stream::Stdin | Stream::Reader(_) => Err(not_writable()),
        }
    }

    pub fn write_str(&self, s: &str) -> io::Result<()> {
        self.write_all(s.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        match &mut *self.lock() {
            Stream::Stdout => io::stdout().lock().flush(),
            Stream::Raw(file) => file.flush(),
            Stream::Writer(writer) => writer.flush(),
            Stream::Stdin | Stream::Reader(_) => Ok(()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Stream> {
        // A poisoned stream is still a stream.
        self.inner.stream.lock().unwrap_or_else(|it| it.into_inner())
    }
}

fn read_line_unbuffered(file: &mut File, buf: &mut String) -> io::Result<usize> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    while file.read(&mut byte)? == 1 {
        line.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    let text = String::from_utf8(line).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    buf.push_str(&text);
    Ok(text.len())
}

fn not_readable() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "file not opened for reading")
}

fn not_writable() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "file not opened for writing")
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("name", &self.name()).field("mode", &self.mode()).finish()
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
