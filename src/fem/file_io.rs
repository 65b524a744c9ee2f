use super::{FunctionSpace, ResultSink, RunSummary, TimeSeries};
use crate::base::{Field, DEFAULT_OUT_DIR};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Holds the first line of a JSON-lines file with the history of a field
#[derive(Debug, Deserialize, Serialize)]
struct SeriesHeader {
    field: Field,
    n_components: usize,
    owner_points: Vec<usize>,
}

/// Holds one line (snapshot) of a JSON-lines file with the history of a field
#[derive(Debug, Deserialize, Serialize)]
struct SeriesRecord<V> {
    time: f64,
    values: V,
}

/// Assists in generating output files
///
/// Each field is written to `<stem>-<field>.jsonl` with a header line followed by one
/// `{time, values}` line per snapshot; the file is flushed after every write. The mesh
/// goes to `<stem>-mesh.json` and the run summary to `<stem>-summary.json`.
pub struct FileIo {
    /// Holds a flag to enable/disable the file generation
    active: bool,

    /// Defines the output directory
    output_dir: String,

    /// Defines the filename stem
    filename_stem: String,

    /// Holds one writer per field (in the order of [Field::all])
    writers: Vec<BufWriter<File>>,

    /// Holds the indices of the snapshots
    pub indices: Vec<usize>,

    /// Holds the simulation times corresponding to each snapshot
    pub times: Vec<f64>,
}

impl FileIo {
    /// Allocates a new instance with deactivated generation of files
    pub fn new() -> Self {
        FileIo {
            active: false,
            output_dir: String::new(),
            filename_stem: String::new(),
            writers: Vec::new(),
            indices: Vec::new(),
            times: Vec::new(),
        }
    }

    /// Activates the generation of files
    ///
    /// # Input
    ///
    /// * `space` -- the function space (mesh and DOF owners)
    /// * `filename_stem` -- the last part of the filename without extension, e.g., "my_simulation"
    /// * `output_directory` -- the directory to save the output files.
    ///   None means that the default directory will be used; see [DEFAULT_OUT_DIR]
    pub fn activate(
        &mut self,
        space: &FunctionSpace,
        filename_stem: &str,
        output_directory: Option<&str>,
    ) -> Result<(), StrError> {
        // output directory
        let out_dir = match output_directory {
            Some(d) => d,
            None => DEFAULT_OUT_DIR,
        };

        // create directory
        fs::create_dir_all(out_dir).map_err(|_| "cannot create output directory")?;

        // set paths
        self.output_dir = out_dir.to_string();
        self.filename_stem = filename_stem.to_string();

        // write the mesh
        space.mesh.write_json(&self.path_mesh())?;

        // open the series files and write the headers
        self.writers.clear();
        for field in Field::all() {
            let file = File::create(&self.path_series(field)).map_err(|_| "cannot create file")?;
            let mut writer = BufWriter::new(file);
            let header = SeriesHeader {
                field,
                n_components: field.n_components(),
                owner_points: space.owner_points(field),
            };
            serde_json::to_writer(&mut writer, &header).map_err(|_| "cannot write file")?;
            writeln!(&mut writer).map_err(|_| "cannot write file")?;
            writer.flush().map_err(|_| "cannot write file")?;
            self.writers.push(writer);
        }

        // done
        self.active = true;
        self.indices.clear();
        self.times.clear();
        Ok(())
    }

    /// Allocates an instance to access existing files (no file is created)
    ///
    /// The snapshot times are taken from the level-set series.
    pub fn open(output_directory: &str, filename_stem: &str) -> Result<Self, StrError> {
        let mut file_io = FileIo::new();
        file_io.output_dir = output_directory.to_string();
        file_io.filename_stem = filename_stem.to_string();
        let series = TimeSeries::read_jsonl(&file_io.path_series(Field::LevelSet))?;
        file_io.indices = (0..series.len()).collect();
        file_io.times = series.times;
        Ok(file_io)
    }

    /// Returns the output directory
    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    /// Generates the filename path for the mesh file
    pub fn path_mesh(&self) -> String {
        format!("{}/{}-mesh.json", self.output_dir, self.filename_stem)
    }

    /// Generates the filename path for the summary file
    pub fn path_summary(&self) -> String {
        format!("{}/{}-summary.json", self.output_dir, self.filename_stem)
    }

    /// Generates the filename path for the last computed state
    pub fn path_state(&self) -> String {
        format!("{}/{}-state.json", self.output_dir, self.filename_stem)
    }

    /// Generates the filename path for the history of a field
    pub fn path_series(&self, field: Field) -> String {
        format!("{}/{}-{}.jsonl", self.output_dir, self.filename_stem, field.name())
    }

    /// Generates the filename path for the VTU files
    pub fn path_vtu(&self, index: usize) -> String {
        format!("{}/{}-{:0>20}.vtu", self.output_dir, self.filename_stem, index)
    }

    /// Generates the filename path for the PVD file
    pub fn path_pvd(&self) -> String {
        format!("{}/{}.pvd", self.output_dir, self.filename_stem)
    }

    /// Writes the summary of a run
    ///
    /// **Note:** No output is generated if the instance is not active.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<(), StrError> {
        if self.active {
            summary.write_json(&self.path_summary())?;
        }
        Ok(())
    }
}

impl ResultSink for FileIo {
    /// Appends a snapshot to the series file of the field
    ///
    /// **Note:** No output is generated if the instance is not active.
    fn write(&mut self, field: Field, time: f64, values: &[f64]) -> Result<(), StrError> {
        if !self.active {
            return Ok(());
        }
        let writer = &mut self.writers[field as usize];
        let record = SeriesRecord { time, values };
        serde_json::to_writer(&mut *writer, &record).map_err(|_| "cannot write file")?;
        writeln!(writer).map_err(|_| "cannot write file")?;
        writer.flush().map_err(|_| "cannot write file")?;
        if field == Field::LevelSet {
            self.indices.push(self.times.len());
            self.times.push(time);
        }
        Ok(())
    }
}

impl TimeSeries {
    /// Reads a JSON-lines file with the history of a field
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_jsonl<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let mut lines = BufReader::new(input).lines();
        let first = match lines.next() {
            Some(line) => line.map_err(|_| "cannot read file")?,
            None => return Err("the series file is empty"),
        };
        let header: SeriesHeader = serde_json::from_str(&first).map_err(|_| "cannot parse JSON file")?;
        let mut series = TimeSeries::new(header.field, header.owner_points);
        series.n_components = header.n_components;
        for line in lines {
            let line = line.map_err(|_| "cannot read file")?;
            if line.trim().is_empty() {
                continue;
            }
            let record: SeriesRecord<Vec<f64>> =
                serde_json::from_str(&line).map_err(|_| "cannot parse JSON file")?;
            series.times.push(record.time);
            series.values.push(record.values);
        }
        Ok(series)
    }
}

impl RunSummary {
    /// Reads a JSON file containing the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let summary = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(summary)
    }

    /// Writes a JSON file with the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
