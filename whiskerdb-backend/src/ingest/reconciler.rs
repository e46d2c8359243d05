use camino::Utf8Path;
use whiskerdb_core::{
    date::{parse_date_prefix, start_of_day},
    error::ParseError,
    identifier::{normalize_cell_id, normalize_subject_id, session_id_from_file_name},
    location::{
        atlas_region, leading_number, leading_region, parse_coordinates, parse_depth,
        parse_recording_location,
    },
    model::{
        cell::{NewCell, NewDevice},
        location::{BrainLocationKey, NewActionLocation, NewBrainLocation},
        lookup::{NewExperimentType, NewExperimenter, NewSpecies},
        session::{NewSession, SessionWithChildren},
        stimulation::{NewPhotoStimDevice, NewPhotoStimInfo, NewPhotoStimulation},
        subject::{NewSubject, Sex},
        virus::{NewVirus, NewVirusInjection, parse_titer},
    },
    units::round2,
    vocabulary::NOT_AVAILABLE,
};

use super::{
    AtStage, IngestContext, Reason, Skip, Stage,
    record::{Extracellular, MetadataRecord, Photostim, Virus},
};
use crate::{
    db::{
        error,
        model::{EnsureId, FillMissing, Upsert, Written},
    },
    decoder::Decoder,
};

fn required<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, Reason> {
    value.map(String::as_str).ok_or_else(|| Reason::missing(field))
}

impl IngestContext {
    /// Runs one metadata file through the pipeline. The first failing stage
    /// ends processing of the file; whatever earlier stages wrote stays.
    pub(super) fn reconcile_file(
        &mut self,
        decoder: &impl Decoder,
        path: &Utf8Path,
    ) -> Result<(), Skip> {
        let file_name = path.file_name().unwrap_or(path.as_str());

        let root = decoder.decode(path).at(Stage::Decode)?;
        let session_id = session_id_from_file_name(file_name).at(Stage::Decode)?;
        let record =
            MetadataRecord::from_value(&root, &self.vocabularies.metadata_root).at(Stage::Decode)?;

        let subject_id = self.resolve_subject(&record).at(Stage::Subject)?;
        let session = self
            .resolve_session(&record, subject_id, session_id, path)
            .at(Stage::Session)?;

        if let Some(extracellular) = &record.extracellular {
            let location = self
                .resolve_recording_location(extracellular)
                .at(Stage::Location)?;
            self.attach_cell(&record, extracellular, &session, location)
                .at(Stage::Cell)?;
        }

        if let Some(photostim) = &record.photostim {
            self.attach_photostim(photostim, &session)
                .at(Stage::Photostim)?;
        }

        if let Some(virus) = &record.virus {
            self.attach_virus(virus, &session.subject_id)
                .at(Stage::Virus)?;
        }

        tracing::debug!(file = %path, session = %session.key(), "committed record");

        Ok(())
    }

    fn resolve_subject(&mut self, record: &MetadataRecord) -> Result<String, Reason> {
        let subject_id = normalize_subject_id(&record.animal_id)?;

        let date_of_birth = match record.date_of_birth.as_deref().map(parse_date_prefix) {
            Some(Ok(date)) => Some(date),
            Some(Err(err)) => {
                tracing::warn!(%subject_id, %err, "ignoring unparseable date of birth");
                None
            }
            None => None,
        };

        let species = NewSpecies {
            name: record
                .species
                .clone()
                .unwrap_or_else(|| self.vocabularies.default_species.clone()),
        };
        species.upsert(&mut self.db_conn)?;

        let subject = NewSubject {
            subject_id,
            species: species.name,
            strain: self
                .strains
                .resolve(record.source_strain.as_deref())
                .to_string(),
            animal_source: self
                .animal_sources
                .resolve(record.source_identifier.as_deref())
                .to_string(),
            sex: Sex::from_source(record.sex.as_deref()),
            date_of_birth,
            description: record.animal_background.clone(),
        };

        match subject.upsert(&mut self.db_conn)? {
            Written::Inserted => {
                tracing::info!(subject_id = %subject.subject_id, "inserted subject");
            }
            Written::Skipped => {
                let n_filled = subject.fill_missing(&mut self.db_conn)?;
                if n_filled > 0 {
                    tracing::info!(
                        subject_id = %subject.subject_id,
                        n_filled,
                        "filled missing subject fields"
                    );
                }
            }
        }

        Ok(subject.subject_id)
    }

    fn resolve_session(
        &mut self,
        record: &MetadataRecord,
        subject_id: String,
        session_id: String,
        path: &Utf8Path,
    ) -> Result<NewSession, Reason> {
        let session_date = parse_date_prefix(&record.date_of_experiment)?;

        for name in &record.experimenters {
            NewExperimenter { name: name.clone() }.upsert(&mut self.db_conn)?;
        }
        for name in &record.experiment_types {
            NewExperimentType { name: name.clone() }.upsert(&mut self.db_conn)?;
        }

        let session = NewSession {
            subject_id,
            session_id,
            session_time: start_of_day(session_date),
            session_directory: path.parent().map(ToString::to_string).unwrap_or_default(),
            session_note: String::new(),
        };

        let with_children =
            SessionWithChildren::new(session, &record.experimenters, &record.experiment_types);

        let written = with_children
            .upsert(&mut self.db_conn)
            .map_err(Reason::from_transaction)?;

        if written == Written::Inserted {
            tracing::info!(
                session = %with_children.session.key(),
                session_time = %with_children.session.session_time,
                "inserted session"
            );
        }

        Ok(with_children.session)
    }

    fn ensure_brain_location(
        &mut self,
        key: BrainLocationKey,
        full_name: &str,
    ) -> error::Result<()> {
        let location = NewBrainLocation::new(key, full_name);

        if location.upsert(&mut self.db_conn)? == Written::Inserted {
            tracing::debug!(?location, "inserted brain location");
        }

        Ok(())
    }

    fn resolve_recording_location(
        &mut self,
        extracellular: &Extracellular,
    ) -> Result<BrainLocationKey, Reason> {
        let description = required(
            extracellular.recording_location.as_ref(),
            "extracellular.recording_coord_location",
        )?;
        let site = parse_recording_location(description)?;

        let hemisphere = self.vocabularies.hemisphere;
        tracing::debug!(%hemisphere, "hemisphere not recorded, using configured default");

        let key = BrainLocationKey::from_site(site, hemisphere);
        let full_name = extracellular
            .atlas_location
            .as_deref()
            .unwrap_or(description);
        self.ensure_brain_location(key.clone(), full_name)?;

        Ok(key)
    }

    fn attach_cell(
        &mut self,
        record: &MetadataRecord,
        extracellular: &Extracellular,
        session: &NewSession,
        location: BrainLocationKey,
    ) -> Result<(), Reason> {
        let label = required(extracellular.device_label.as_ref(), "extracellular device label")?;
        let device = NewDevice::from_device_label(label);
        device.upsert(&mut self.db_conn)?;

        let raw_cell_id = required(record.cell.as_ref(), "cell")?;
        let cell_id = normalize_cell_id(raw_cell_id, &self.vocabularies.cell_id_suffix)?;

        let recording_depth = extracellular.recording_depth.as_deref().and_then(parse_depth);
        if recording_depth.is_none() {
            tracing::debug!(%cell_id, "no recording depth");
        }

        let BrainLocationKey {
            brain_region,
            brain_subregion,
            cortical_layer,
            hemisphere,
        } = location;

        let cell = NewCell {
            subject_id: session.subject_id.clone(),
            session_id: session.session_id.clone(),
            cell_id,
            cell_type: extracellular
                .cell_type
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            device_name: device.name,
            brain_region,
            brain_subregion,
            cortical_layer,
            hemisphere,
            recording_depth,
        };

        if cell.upsert(&mut self.db_conn)? == Written::Inserted {
            tracing::info!(session = %session.key(), cell_id = %cell.cell_id, "inserted cell");
        }

        Ok(())
    }

    /// A whole-region brain location with stereotaxic coordinates, returning
    /// the id of its action location.
    fn ensure_action_location(
        &mut self,
        region: String,
        full_name: &str,
        coord_location: Option<&String>,
        coord_field: &str,
    ) -> Result<i32, Reason> {
        let key = BrainLocationKey::region(region, self.vocabularies.hemisphere);
        self.ensure_brain_location(key.clone(), full_name)?;

        let coordinates = parse_coordinates(required(coord_location, coord_field)?)?;
        let action_location =
            NewActionLocation::new(key, self.vocabularies.coordinate_reference, coordinates);

        Ok(action_location.ensure_id(&mut self.db_conn)?)
    }

    fn attach_photostim(
        &mut self,
        photostim: &Photostim,
        session: &NewSession,
    ) -> Result<(), Reason> {
        let atlas_location = required(
            photostim.atlas_location.as_ref(),
            "photostim.photostim_atlas_location",
        )?;
        let action_location_id = self.ensure_action_location(
            atlas_region(atlas_location)?,
            atlas_location,
            photostim.coord_location.as_ref(),
            "photostim.photostim_coord_location",
        )?;

        let device = NewPhotoStimDevice {
            name: self.vocabularies.photostim_device.clone(),
        };
        device.upsert(&mut self.db_conn)?;

        let lambda = leading_number(required(photostim.lambda.as_ref(), "photostim.lambda")?)?;

        let photostim_info_id = NewPhotoStimInfo {
            action_location_id,
            device_name: device.name,
            excitation_lambda: lambda,
            stimulation_method: photostim
                .stimulation_method
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
        .ensure_id(&mut self.db_conn)?;

        let stimulation = NewPhotoStimulation {
            subject_id: session.subject_id.clone(),
            session_id: session.session_id.clone(),
            photostim_datetime: session.session_time,
            photostim_info_id,
        };

        if stimulation.upsert(&mut self.db_conn)? == Written::Inserted {
            tracing::info!(
                session = %session.key(),
                photostim_info_id,
                "inserted photostimulation"
            );
        }

        Ok(())
    }

    fn attach_virus(&mut self, virus: &Virus, subject_id: &str) -> Result<(), Reason> {
        let virus_id = NewVirus {
            virus_source: virus
                .source
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            virus_name: required(virus.name.as_ref(), "virus.virus_name")?.to_string(),
            lot_number: virus.lot_number.clone().unwrap_or_default(),
            titer: parse_titer(virus.titer.as_deref()),
        }
        .ensure_id(&mut self.db_conn)?;

        let atlas_location = required(virus.atlas_location.as_ref(), "virus.atlas_location")?;
        let action_location_id = self.ensure_action_location(
            leading_region(atlas_location)?,
            atlas_location,
            virus.coord_location.as_ref(),
            "virus.virus_coord_location",
        )?;

        let injection_date =
            parse_date_prefix(required(virus.injection_date.as_ref(), "virus.injection_date")?)?;

        if virus.depths.len() != virus.volumes.len() {
            tracing::warn!(
                subject_id,
                n_depths = virus.depths.len(),
                n_volumes = virus.volumes.len(),
                "unpaired injection depths and volumes are ignored"
            );
        }

        let mut n_inserted = 0;
        for pair in virus.depths.iter().zip(&virus.volumes) {
            let (Some(depth), Some(volume)) = pair else {
                tracing::warn!(
                    subject_id,
                    ?pair,
                    "ignoring injection with missing depth or volume"
                );
                continue;
            };

            let injection_depth = parse_depth(depth).ok_or_else(|| ParseError::UnparseableNumber {
                raw: depth.clone(),
            })?;
            let injection_volume = round2(leading_number(volume)?);

            let injection = NewVirusInjection {
                subject_id: subject_id.to_string(),
                virus_id,
                action_location_id,
                injection_date,
                injection_depth,
                injection_volume,
            };

            if injection.upsert(&mut self.db_conn)? == Written::Inserted {
                n_inserted += 1;
            }
        }

        if n_inserted > 0 {
            tracing::info!(subject_id, virus_id, n_inserted, "inserted virus injections");
        }

        Ok(())
    }
}
